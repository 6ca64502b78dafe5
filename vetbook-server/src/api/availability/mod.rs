//! Availability API 模块
//!
//! 只读档期查询，可在用户编辑日期区间时反复调用，不产生任何副作用。

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::booking::CageAvailability;
use crate::core::ServerState;
use crate::db::models::CageType;
use crate::utils::AppResult;
use crate::utils::time::parse_date;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/availability", get(find))
}

/// Query params for an availability lookup
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: String,
    pub check_out: String,
    #[serde(rename = "type")]
    pub cage_type: Option<CageType>,
}

/// GET /api/availability - 指定日期区间内无档期冲突的笼位
pub async fn find(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<CageAvailability>>> {
    let check_in = parse_date(&query.check_in)?;
    let check_out = parse_date(&query.check_out)?;

    let available = state
        .availability
        .find_available_cages(check_in, check_out, query.cage_type)
        .await?;
    Ok(Json(available))
}
