//! Debit Card Transaction Endpoints
//!
//! Listing, creation and detail for card transactions. Creation is delegated
//! to the transaction intake service which owns the check ordering.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::Principal;
use crate::db::DebitCardTransaction;
use crate::error::ApiError;
use crate::services::{ownership, transaction_intake};
use crate::AppState;

// ============ Response Types ============

/// 거래 응답
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub debit_card_id: i64,
    pub amount: i64,
    pub currency_code: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
}

impl From<DebitCardTransaction> for TransactionResponse {
    fn from(transaction: DebitCardTransaction) -> Self {
        Self {
            id: transaction.id,
            debit_card_id: transaction.debit_card_id,
            amount: transaction.amount,
            currency_code: transaction.currency_code,
            transaction_type: transaction.transaction_type,
        }
    }
}

// ============ Handlers ============

/// GET /debit-card-transactions
///
/// Principal 소유 live 카드들의 거래 목록
pub async fn list_transactions(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let transactions = state.db.list_transactions_for_user(principal.id).await?;

    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}

/// POST /debit-card-transactions
///
/// 거래 생성. `debit_card_id` 생략 시 principal의 유일한 카드로 추론
///
/// # Request
///
/// ```json
/// {"debit_card_id": 1, "amount": 10000, "type": "purchase"}
/// ```
pub async fn create_transaction(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let transaction = transaction_intake::create(&state.db, &principal, &body).await?;

    tracing::info!(
        transaction_id = transaction.id,
        card_id = transaction.debit_card_id,
        "debit card transaction created"
    );

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(transaction))))
}

/// GET /debit-card-transactions/:id
///
/// 거래 상세. 부모 카드 소유자가 아니면 403
pub async fn transaction_detail(
    State(state): State<AppState>,
    principal: Principal,
    Path(transaction_id): Path<i64>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = state
        .db
        .find_transaction(transaction_id)
        .await?
        .ok_or(ApiError::NotFound("Debit card transaction"))?;

    let card = state
        .db
        .find_live_debit_card(transaction.debit_card_id)
        .await?
        .ok_or(ApiError::NotFound("Debit card transaction"))?;

    ownership::ensure_owner(&principal, card.user_id)?;

    Ok(Json(TransactionResponse::from(transaction)))
}
