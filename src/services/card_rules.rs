//! Card Invariant Engine
//!
//! Pure state machine for debit card lifecycle plus creation validation.
//! Holds no state of its own: callers feed it the card's current snapshot
//! (state + dependent transaction count) and it judges the proposed change.
//! The store invokes these checks inside its SQL transaction so the check
//! and the write commit as one unit.

use serde_json::Value;
use thiserror::Error;

use crate::error::ValidationErrors;
use crate::types::{CardNumber, CARD_TYPES};

/// 카드 상태
/// - Active: 사용 가능 (disabled_at NULL)
/// - Inactive: 비활성 (disabled_at 설정됨)
/// - Deleted: tombstone, 종단 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Active,
    Inactive,
    Deleted,
}

/// 제안된 상태 전이
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTransition {
    Activate,
    Deactivate,
    Delete,
}

/// 전이 거부 사유
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// 거래가 남아 있는 카드는 삭제 불가
    #[error("card has dependent transactions")]
    HasDependentTransactions,

    /// Deleted 카드에는 어떤 전이도 불가 (호출부에서 NotFound로 처리)
    #[error("card is deleted")]
    CardDeleted,
}

/// 카드 상태 전이 검증
///
/// # Transition Table
///
/// ```text
/// Inactive -> Active      항상 허용 (disabled_at 해제)
/// Active   -> Inactive    항상 허용 (disabled_at 설정)
/// *        -> Delete      거래 0건일 때만 허용
/// Deleted  -> *           불가
/// 현재 상태로의 토글        no-op 성공 (멱등)
/// ```
pub fn validate_transition(
    state: CardState,
    transition: CardTransition,
    transaction_count: i64,
) -> Result<(), Violation> {
    if state == CardState::Deleted {
        return Err(Violation::CardDeleted);
    }

    match transition {
        CardTransition::Activate | CardTransition::Deactivate => Ok(()),
        CardTransition::Delete => {
            if transaction_count > 0 {
                Err(Violation::HasDependentTransactions)
            } else {
                Ok(())
            }
        }
    }
}

/// 검증된 카드 생성 요청
#[derive(Debug)]
pub struct ValidatedCardRequest {
    pub card_type: String,
    /// None이면 저장 시점에 생성
    pub number: Option<CardNumber>,
}

/// 카드 생성 요청 검증
///
/// - `type`: 필수, 인식되는 카드 타입
/// - `number`: 옵션, 있으면 16자리 숫자여야 함 (없으면 자동 생성)
///
/// 유일성 검증은 저장소 트랜잭션 안에서 수행됨
pub fn validate_create_request(body: &Value) -> Result<ValidatedCardRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let card_type = match body.get("type").and_then(Value::as_str) {
        Some(t) if CARD_TYPES.contains(&t) => Some(t.to_string()),
        Some(_) => {
            errors.add("type", "The selected type is invalid");
            None
        }
        None => {
            errors.add("type", "The type field is required");
            None
        }
    };

    let number = match body.get("number") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => match CardNumber::new(raw) {
            Ok(number) => Some(number),
            Err(message) => {
                errors.add("number", message);
                None
            }
        },
        Some(_) => {
            errors.add("number", "The number must be a string of 16 digits");
            None
        }
    };

    if errors.is_empty() {
        Ok(ValidatedCardRequest {
            card_type: card_type.expect("type validated above"),
            number,
        })
    } else {
        Err(errors)
    }
}

/// 카드 수정 요청 검증: `is_active`는 필수 boolean
pub fn validate_update_request(body: &Value) -> Result<bool, ValidationErrors> {
    match body.get("is_active") {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(ValidationErrors::single(
            "is_active",
            "The is_active field must be true or false",
        )),
        None => Err(ValidationErrors::single(
            "is_active",
            "The is_active field is required",
        )),
    }
}
