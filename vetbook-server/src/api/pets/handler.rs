//! Pet API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Pet, PetCreate};
use crate::db::repository::PetRepository;
use crate::utils::{AppError, AppResult};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

/// GET /api/pets - 获取宠物列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Pet>>> {
    let repo = PetRepository::new(state.db.clone());
    let pets = repo.find_all().await?;
    Ok(Json(pets))
}

/// GET /api/pets/:id - 获取单个宠物
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Pet>> {
    let repo = PetRepository::new(state.db.clone());
    let pet = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pet {} not found", id)))?;
    Ok(Json(pet))
}

/// POST /api/pets - 创建宠物 (管理端种子录入)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PetCreate>,
) -> AppResult<Json<Pet>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let repo = PetRepository::new(state.db.clone());
    let pet = repo.create(payload).await?;
    Ok(Json(pet))
}
