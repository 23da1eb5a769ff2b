//! Database Models
//!
//! Record types for customers, debit cards, card transactions and loans.
//! Soft-deleted rows stay in the tables with `deleted_at` set; the store
//! filters them out of every read path.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::services::card_rules::CardState;

/// 고객 계정
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,

    pub name: String,

    /// 로그인 식별자 (unique)
    pub email: String,

    pub created_at: DateTime<Utc>,
}

/// 직불 카드
#[derive(Debug, Clone, FromRow)]
pub struct DebitCard {
    pub id: i64,

    /// 소유자
    pub user_id: i64,

    /// 카드 타입
    /// - gpn
    /// - visa
    /// - mastercard
    #[sqlx(rename = "type")]
    pub card_type: String,

    /// 16자리 카드 번호 (live 카드 중 unique)
    pub number: String,

    pub is_active: bool,

    /// 비활성화 시각. is_active == true 이면 항상 NULL
    pub disabled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    /// Soft delete tombstone
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DebitCard {
    /// Tombstone 되지 않은 카드인지
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// 카드의 현재 상태 (invariant engine 입력)
    pub fn state(&self) -> CardState {
        if self.deleted_at.is_some() {
            CardState::Deleted
        } else if self.is_active {
            CardState::Active
        } else {
            CardState::Inactive
        }
    }
}

/// 직불 카드 거래 (생성 후 불변)
#[derive(Debug, Clone, FromRow)]
pub struct DebitCardTransaction {
    pub id: i64,

    pub debit_card_id: i64,

    /// 거래 금액 (양의 정수)
    pub amount: i64,

    /// 통화 코드
    /// - IDR / SGD / THB / VND
    pub currency_code: String,

    /// 거래 타입
    /// - purchase: 구매
    /// - debit: 출금
    #[sqlx(rename = "type")]
    pub transaction_type: String,

    pub created_at: DateTime<Utc>,
}

/// 대출 (주변 엔티티, 상환 로직은 범위 외)
#[derive(Debug, Clone, FromRow)]
pub struct Loan {
    pub id: i64,

    pub user_id: i64,

    pub amount: i64,

    /// 상환 회차 수
    pub terms: i64,

    /// 잔여 원금. 생성 시 amount와 동일하게 계산됨
    pub outstanding_amount: i64,

    pub currency_code: String,

    pub processed_at: Option<DateTime<Utc>>,

    /// - due: 상환 중
    /// - repaid: 상환 완료
    pub status: String,

    pub created_at: DateTime<Utc>,
}

/// 상환 스케줄
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledRepayment {
    pub id: i64,

    pub loan_id: i64,

    pub amount: i64,

    pub outstanding_amount: i64,

    pub currency_code: String,

    pub due_date: DateTime<Utc>,

    /// - due: 상환 예정
    /// - repaid: 상환 완료
    pub status: String,

    pub created_at: DateTime<Utc>,
}

/// 대출 상태 상수
pub const LOAN_STATUS_DUE: &str = "due";
pub const LOAN_STATUS_REPAID: &str = "repaid";
