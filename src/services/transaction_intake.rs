//! Transaction Intake
//!
//! Validates and creates debit card transactions. The ordering here is the
//! contract: resolve the target card, then ownership, then the activity
//! gate, and only then field validation. A caller probing a foreign card
//! therefore sees 403 before any hint about its payload.

use serde_json::Value;

use crate::auth::Principal;
use crate::db::{Database, DebitCard, DebitCardTransaction, TransactionCreateOutcome};
use crate::error::{ApiError, ValidationErrors};
use crate::services::ownership;
use crate::types::{CURRENCIES, DEFAULT_CURRENCY, TRANSACTION_TYPES};

/// 거래 생성
///
/// # Contract
///
/// 1. 대상 카드 결정: `debit_card_id` 명시 또는 principal의 유일한 카드
/// 2. live 카드 없음 → 404
/// 3. 소유권 위반 → 403
/// 4. 비활성 카드 → 403
/// 5. 필드 검증 (amount/type/currency_code) → 422
/// 6. 저장소 트랜잭션 안에서 재검증 후 삽입
pub async fn create(
    db: &Database,
    principal: &Principal,
    body: &Value,
) -> Result<DebitCardTransaction, ApiError> {
    let card = resolve_card(db, principal, body).await?;

    ownership::ensure_owner(principal, card.user_id)?;

    if !card.is_active {
        return Err(ApiError::CardInactive);
    }

    let (amount, currency_code, transaction_type) = validate_fields(body)?;

    match db
        .create_transaction(card.id, amount, &currency_code, &transaction_type)
        .await?
    {
        TransactionCreateOutcome::Created(transaction) => Ok(transaction),
        // 검증과 삽입 사이에 카드 상태가 바뀐 경우
        TransactionCreateOutcome::CardInactive => Err(ApiError::CardInactive),
        TransactionCreateOutcome::CardGone => Err(ApiError::NotFound("Debit card")),
    }
}

/// 대상 카드 결정
///
/// `debit_card_id`가 없으면 principal의 유일한 live 카드로 추론.
/// 카드가 없으면 404, 여러 장이면 명시를 요구하는 422
async fn resolve_card(
    db: &Database,
    principal: &Principal,
    body: &Value,
) -> Result<DebitCard, ApiError> {
    match body.get("debit_card_id") {
        None | Some(Value::Null) => {
            let mut cards = db.list_debit_cards(principal.id).await?;
            match cards.len() {
                0 => Err(ApiError::NotFound("Debit card")),
                1 => Ok(cards.remove(0)),
                _ => Err(ApiError::Validation(ValidationErrors::single(
                    "debit_card_id",
                    "The debit_card_id field is required when owning more than one card",
                ))),
            }
        }
        Some(value) => {
            let card_id = value.as_i64().ok_or_else(|| {
                ApiError::Validation(ValidationErrors::single(
                    "debit_card_id",
                    "The debit_card_id field must be an integer",
                ))
            })?;

            db.find_live_debit_card(card_id)
                .await?
                .ok_or(ApiError::NotFound("Debit card"))
        }
    }
}

/// 필드 검증: amount는 양의 정수, type/currency_code는 인식되는 값
fn validate_fields(body: &Value) -> Result<(i64, String, String), ApiError> {
    let mut errors = ValidationErrors::new();

    let amount = match body.get("amount") {
        Some(value) => match value.as_i64() {
            Some(amount) if amount > 0 => Some(amount),
            _ => {
                errors.add("amount", "The amount must be a positive integer");
                None
            }
        },
        None => {
            errors.add("amount", "The amount field is required");
            None
        }
    };

    let transaction_type = match body.get("type").and_then(Value::as_str) {
        Some(t) if TRANSACTION_TYPES.contains(&t) => Some(t.to_string()),
        Some(_) => {
            errors.add("type", "The selected type is invalid");
            None
        }
        None => {
            errors.add("type", "The type field is required");
            None
        }
    };

    let currency_code = match body.get("currency_code") {
        None | Some(Value::Null) => Some(DEFAULT_CURRENCY.to_string()),
        Some(value) => match value.as_str() {
            Some(code) if CURRENCIES.contains(&code) => Some(code.to_string()),
            _ => {
                errors.add("currency_code", "The selected currency_code is invalid");
                None
            }
        },
    };

    errors.into_result()?;

    Ok((
        amount.expect("validated above"),
        currency_code.expect("validated above"),
        transaction_type.expect("validated above"),
    ))
}
