//! Loan Endpoints (read-only)
//!
//! 대출과 상환 스케줄 조회. 상환/변제 로직은 이 서비스 범위 밖

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Principal;
use crate::db::{Loan, ScheduledRepayment};
use crate::error::ApiError;
use crate::services::ownership;
use crate::AppState;

/// 대출 응답
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: i64,
    pub amount: i64,
    pub terms: i64,
    pub outstanding_amount: i64,
    pub currency_code: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            amount: loan.amount,
            terms: loan.terms,
            outstanding_amount: loan.outstanding_amount,
            currency_code: loan.currency_code,
            processed_at: loan.processed_at,
            status: loan.status,
        }
    }
}

/// 대출 상세 (상환 스케줄 포함)
#[derive(Debug, Serialize)]
pub struct LoanDetailResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub scheduled_repayments: Vec<RepaymentResponse>,
}

#[derive(Debug, Serialize)]
pub struct RepaymentResponse {
    pub id: i64,
    pub amount: i64,
    pub outstanding_amount: i64,
    pub currency_code: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
}

impl From<ScheduledRepayment> for RepaymentResponse {
    fn from(repayment: ScheduledRepayment) -> Self {
        Self {
            id: repayment.id,
            amount: repayment.amount,
            outstanding_amount: repayment.outstanding_amount,
            currency_code: repayment.currency_code,
            due_date: repayment.due_date,
            status: repayment.status,
        }
    }
}

/// GET /loans
///
/// Principal 소유 대출 목록
pub async fn list_loans(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = state.db.list_loans(principal.id).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/:id
///
/// 대출 상세와 상환 스케줄. 남의 대출은 403
pub async fn loan_detail(
    State(state): State<AppState>,
    principal: Principal,
    Path(loan_id): Path<i64>,
) -> Result<Json<LoanDetailResponse>, ApiError> {
    let loan = state
        .db
        .find_loan(loan_id)
        .await?
        .ok_or(ApiError::NotFound("Loan"))?;

    ownership::ensure_owner(&principal, loan.user_id)?;

    let repayments = state.db.list_scheduled_repayments(loan.id).await?;

    Ok(Json(LoanDetailResponse {
        loan: LoanResponse::from(loan),
        scheduled_repayments: repayments.into_iter().map(RepaymentResponse::from).collect(),
    }))
}
