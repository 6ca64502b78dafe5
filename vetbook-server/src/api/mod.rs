//! HTTP API
//!
//! 每个资源一个子模块，提供自己的 `router()`；[`build_app`] 统一合并
//! 并挂载中间件。

pub mod availability;
pub mod cages;
pub mod health;
pub mod pets;
pub mod reservations;
pub mod services;

use axum::{Router, http::HeaderMap, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: axum::extract::Request,
    next: middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// The acting admin, taken from the `X-Operator` header.
///
/// Session mechanics live outside the engine; the header is trusted as-is.
pub fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get("x-operator")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("admin")
        .to_string()
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        // Core APIs
        .merge(health::router())
        // Resource catalog APIs
        .merge(cages::router())
        .merge(services::router())
        .merge(pets::router())
        // Booking APIs
        .merge(availability::router())
        .merge(reservations::router())
        .with_state(state)
        // Tower HTTP 中间件
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件
        .layer(middleware::from_fn(log_request))
}
