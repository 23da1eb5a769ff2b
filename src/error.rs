//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 소유권 위반, 비활성 카드 거래, 거래 있는 카드 삭제: 모두 403
///   (HTTP 코드는 호환성 유지, body의 code 필드로만 구분)
/// - 422는 필드 단위 에러 목록을 함께 반환
///
/// 민감한 내부 정보는 클라이언트에 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 401 Unauthorized ============
    #[error("Authentication required")]
    Unauthenticated,

    // ============ 403 Forbidden ============
    #[error("Forbidden")]
    Forbidden,

    #[error("Debit card is inactive")]
    CardInactive,

    #[error("Debit card has transactions")]
    CardHasTransactions,

    // ============ 404 Not Found ============
    #[error("{0} not found")]
    NotFound(&'static str),

    // ============ 422 Unprocessable Entity ============
    #[error("Validation failed")]
    Validation(ValidationErrors),

    // ============ 500 Internal Server Error ============
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalError,
}

/// 필드 단위 검증 에러 모음
///
/// 응답 예시: `{"errors": {"number": ["The number must be exactly 16 digits"]}}`
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 단일 필드 에러로 바로 생성
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 누적된 에러가 있으면 `ApiError::Validation`으로 변환
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, errors) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required".to_string(),
                None,
            ),

            // 4xx 클라이언트 에러: 상태 코드는 모두 403, code로만 구분
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You do not have access to this resource".to_string(),
                None,
            ),
            ApiError::CardInactive => (
                StatusCode::FORBIDDEN,
                "CARD_INACTIVE",
                "Inactive debit card cannot be used for transactions".to_string(),
                None,
            ),
            ApiError::CardHasTransactions => (
                StatusCode::FORBIDDEN,
                "CARD_HAS_TRANSACTIONS",
                "Debit card with transactions cannot be deleted".to_string(),
                None,
            ),

            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
                None,
            ),

            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                "The given data was invalid".to_string(),
                Some(errors),
            ),

            // 5xx 서버 에러
            ApiError::DatabaseError(ref msg) => {
                // 내부 에러는 클라이언트에 상세 정보 노출 안 함
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                    None,
                )
            }
            ApiError::InternalError => {
                tracing::error!("Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// SQLx 에러를 ApiError로 변환
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("SQLx error: {:?}", err);
        ApiError::DatabaseError(err.to_string())
    }
}

/// anyhow 에러를 ApiError로 변환
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Anyhow error: {:?}", err);
        ApiError::InternalError
    }
}
