//! Debit Card Endpoints
//!
//! Card listing, creation, detail, activity toggle and soft deletion.
//! Bodies of mutating endpoints arrive as raw JSON and are validated after
//! the ownership checks, so authorization outranks validation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Principal;
use crate::db::{CardCreateOutcome, CardDeleteOutcome, CardUpdateOutcome, DebitCard};
use crate::error::{ApiError, ValidationErrors};
use crate::services::{card_rules, ownership};
use crate::AppState;

// ============ Response Types ============

/// 카드 응답
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub card_type: String,
    pub number: String,
    pub is_active: bool,
}

impl From<DebitCard> for CardResponse {
    fn from(card: DebitCard) -> Self {
        Self {
            id: card.id,
            card_type: card.card_type,
            number: card.number,
            is_active: card.is_active,
        }
    }
}

// ============ Handlers ============

/// GET /debit-cards
///
/// Principal 소유의 live 카드 목록
///
/// # Response
///
/// ```json
/// [
///   {"id": 1, "type": "gpn", "number": "4539578763621486", "is_active": true}
/// ]
/// ```
pub async fn list_cards(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    let cards = state.db.list_debit_cards(principal.id).await?;

    Ok(Json(cards.into_iter().map(CardResponse::from).collect()))
}

/// POST /debit-cards
///
/// 카드 생성. `number`는 옵션 (없으면 유일한 16자리 번호 생성)
///
/// # Request
///
/// ```json
/// {"type": "gpn", "number": "1234567890123456"}
/// ```
pub async fn create_card(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    let request = card_rules::validate_create_request(&body).map_err(ApiError::Validation)?;

    match state
        .db
        .create_debit_card(principal.id, &request.card_type, request.number)
        .await?
    {
        CardCreateOutcome::Created(card) => {
            tracing::info!(card_id = card.id, user_id = principal.id, "debit card created");
            Ok((StatusCode::CREATED, Json(CardResponse::from(card))))
        }
        CardCreateOutcome::NumberTaken => Err(ApiError::Validation(ValidationErrors::single(
            "number",
            "The number has already been taken",
        ))),
    }
}

/// GET /debit-cards/:id
///
/// 카드 상세. 남의 카드는 403 (존재 여부는 숨기지 않음), tombstone은 404
pub async fn card_detail(
    State(state): State<AppState>,
    principal: Principal,
    Path(card_id): Path<i64>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state
        .db
        .find_live_debit_card(card_id)
        .await?
        .ok_or(ApiError::NotFound("Debit card"))?;

    ownership::ensure_owner(&principal, card.user_id)?;

    Ok(Json(CardResponse::from(card)))
}

/// PUT /debit-cards/:id
///
/// 활성화 토글. `is_active`는 필수 boolean.
/// 현재 값으로의 토글은 no-op 성공 (disabled_at 유지)
///
/// # Request
///
/// ```json
/// {"is_active": false}
/// ```
pub async fn update_card(
    State(state): State<AppState>,
    principal: Principal,
    Path(card_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state
        .db
        .find_live_debit_card(card_id)
        .await?
        .ok_or(ApiError::NotFound("Debit card"))?;

    ownership::ensure_owner(&principal, card.user_id)?;

    let is_active = card_rules::validate_update_request(&body).map_err(ApiError::Validation)?;

    match state.db.set_card_active(card.id, is_active).await? {
        CardUpdateOutcome::Updated(card) => Ok(Json(CardResponse::from(card))),
        CardUpdateOutcome::Gone => Err(ApiError::NotFound("Debit card")),
    }
}

/// DELETE /debit-cards/:id
///
/// Soft delete. 거래가 하나라도 있으면 403
pub async fn delete_card(
    State(state): State<AppState>,
    principal: Principal,
    Path(card_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let card = state
        .db
        .find_live_debit_card(card_id)
        .await?
        .ok_or(ApiError::NotFound("Debit card"))?;

    ownership::ensure_owner(&principal, card.user_id)?;

    match state.db.soft_delete_card(card.id).await? {
        CardDeleteOutcome::Deleted => {
            tracing::info!(card_id = card.id, user_id = principal.id, "debit card soft deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        CardDeleteOutcome::HasTransactions => Err(ApiError::CardHasTransactions),
        CardDeleteOutcome::Gone => Err(ApiError::NotFound("Debit card")),
    }
}
