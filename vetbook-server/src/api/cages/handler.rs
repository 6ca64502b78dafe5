//! Cage API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Cage, CageCreate, CageStatus, CageType, CageUpdate};
use crate::db::repository::CageRepository;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

/// Query params for listing cages
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<CageStatus>,
    #[serde(rename = "type")]
    pub cage_type: Option<CageType>,
}

/// GET /api/cages - 获取笼位列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Cage>>> {
    let repo = CageRepository::new(state.db.clone());
    let cages = repo.find_all(query.status, query.cage_type).await?;
    Ok(Json(cages))
}

/// GET /api/cages/:id - 获取单个笼位
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Cage>> {
    let repo = CageRepository::new(state.db.clone());
    let cage = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| crate::utils::AppError::not_found(format!("Cage {} not found", id)))?;
    Ok(Json(cage))
}

/// POST /api/cages - 创建笼位
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CageCreate>,
) -> AppResult<Json<Cage>> {
    validate_required_text(&payload.cage_number, "cage_number", MAX_NAME_LEN)?;
    let repo = CageRepository::new(state.db.clone());
    let cage = repo.create(payload).await?;
    Ok(Json(cage))
}

/// PUT /api/cages/:id - 更新笼位
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CageUpdate>,
) -> AppResult<Json<Cage>> {
    if let Some(number) = &payload.cage_number {
        validate_required_text(number, "cage_number", MAX_NAME_LEN)?;
    }
    let repo = CageRepository::new(state.db.clone());
    let cage = repo.update(&id, payload).await?;
    Ok(Json(cage))
}

/// DELETE /api/cages/:id - 删除笼位
///
/// 有活跃预约引用时返回 409，不允许孤儿预约。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CageRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(Json(result))
}
