//! Reservation API Handlers
//!
//! 写操作全部经过 [`BookingStore`](crate::booking::BookingStore)，
//! 读操作直接走 repository。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::api::actor_from;
use crate::booking::DocumentSubject;
use crate::core::ServerState;
use crate::db::models::{
    Reservation, ReservationCreate, ReservationStatus, ReservationUpdate, VerifyStatus,
};
use crate::db::repository::ReservationRepository;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn validate_create(payload: &ReservationCreate) -> AppResult<()> {
    validate_required_text(&payload.payment_method, "payment_method", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.receipt_url, "receipt_url", MAX_URL_LEN)?;
    validate_optional_text(&payload.id_document_url, "id_document_url", MAX_URL_LEN)?;
    validate_optional_text(&payload.signature_url, "signature_url", MAX_URL_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_update(payload: &ReservationUpdate) -> AppResult<()> {
    if let Some(method) = &payload.payment_method {
        validate_required_text(method, "payment_method", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

/// Query params for listing reservations
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<ReservationStatus>,
    pub pet_id: Option<String>,
}

/// GET /api/reservations - 预约列表 (最新在前)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let repo = ReservationRepository::new(state.db.clone());
    let reservations = repo.find_all(query.status, query.pet_id.as_deref()).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/:id - 预约详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let repo = ReservationRepository::new(state.db.clone());
    let reservation = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;
    Ok(Json(reservation))
}

/// Create response: id + the initial status the state machine assigned
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub reservation_id: String,
    pub initial_status: ReservationStatus,
    pub total_amount: f64,
}

/// POST /api/reservations - 创建预约
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<CreateResponse>> {
    validate_create(&payload)?;
    let reservation = state.booking.create(payload).await?;
    Ok(Json(CreateResponse {
        reservation_id: reservation.id_string(),
        initial_status: reservation.status,
        total_amount: reservation.total_amount,
    }))
}

/// PATCH /api/reservations/:id - 管理端编辑 (入住前)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<Reservation>> {
    validate_update(&payload)?;
    let actor = actor_from(&headers);
    let reservation = state.booking.update_details(&id, payload, &actor).await?;
    Ok(Json(reservation))
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ReservationStatus,
}

/// Status change response
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub status: ReservationStatus,
}

/// PATCH /api/reservations/:id/status - 状态流转
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<StatusChangeRequest>,
) -> AppResult<Json<StatusChangeResponse>> {
    let actor = actor_from(&headers);
    let reservation = state
        .booking
        .request_transition(&id, payload.status, &actor)
        .await?;
    Ok(Json(StatusChangeResponse {
        status: reservation.status,
    }))
}

/// Receipt review request
#[derive(Debug, Deserialize)]
pub struct ReceiptDecisionRequest {
    pub approved: bool,
}

/// Receipt review response
#[derive(Debug, Serialize)]
pub struct ReceiptDecisionResponse {
    pub status: ReservationStatus,
    pub receipt_verified: VerifyStatus,
}

/// POST /api/reservations/:id/receipt/verify - 凭证审核
pub async fn verify_receipt(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ReceiptDecisionRequest>,
) -> AppResult<Json<ReceiptDecisionResponse>> {
    let actor = actor_from(&headers);
    let reservation = state
        .booking
        .decide_receipt(&id, payload.approved, &actor)
        .await?;
    Ok(Json(ReceiptDecisionResponse {
        status: reservation.status,
        receipt_verified: reservation.receipt.status,
    }))
}

/// Document review request
#[derive(Debug, Deserialize)]
pub struct DocumentDecisionRequest {
    pub subject: DocumentSubject,
    pub approved: bool,
    pub rejection_reason: Option<String>,
}

/// Document review response
#[derive(Debug, Serialize)]
pub struct DocumentDecisionResponse {
    pub status: ReservationStatus,
    pub verified: VerifyStatus,
}

/// POST /api/reservations/:id/documents/verify - 证件/签名审核
pub async fn verify_document(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<DocumentDecisionRequest>,
) -> AppResult<Json<DocumentDecisionResponse>> {
    let actor = actor_from(&headers);
    let reservation = state
        .booking
        .decide_document(
            &id,
            payload.subject,
            payload.approved,
            payload.rejection_reason,
            &actor,
        )
        .await?;
    let verified = match payload.subject {
        DocumentSubject::Id => reservation.id_document.status,
        DocumentSubject::Signature => reservation.signature.status,
    };
    Ok(Json(DocumentDecisionResponse {
        status: reservation.status,
        verified,
    }))
}

/// DELETE /api/reservations/:id - 硬删除 (仅管理端)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let result = state.booking.delete(&id).await?;
    Ok(Json(result))
}
