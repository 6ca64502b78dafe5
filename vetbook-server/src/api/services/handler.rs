//! Service API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Service, ServiceCategory, ServiceCreate, ServiceUpdate};
use crate::db::repository::ServiceRepository;
use crate::utils::{AppError, AppResult};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

/// Query params for listing services
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<ServiceCategory>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/services - 获取服务列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Service>>> {
    let repo = ServiceRepository::new(state.db.clone());
    let services = repo.find_all(query.category, query.include_inactive).await?;
    Ok(Json(services))
}

/// GET /api/services/:id - 获取单个服务
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let repo = ServiceRepository::new(state.db.clone());
    let service = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service {} not found", id)))?;
    Ok(Json(service))
}

/// POST /api/services - 创建服务
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceCreate>,
) -> AppResult<Json<Service>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let repo = ServiceRepository::new(state.db.clone());
    let service = repo.create(payload).await?;
    Ok(Json(service))
}

/// PUT /api/services/:id - 更新服务
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let repo = ServiceRepository::new(state.db.clone());
    let service = repo.update(&id, payload).await?;
    Ok(Json(service))
}

/// DELETE /api/services/:id - 删除服务
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ServiceRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
