//! Authentication Module
//!
//! # Interview Q&A
//!
//! Q: 인증은 어디까지 이 서비스의 책임인가?
//! A: 토큰 해석까지만
//!    - 토큰 발급/갱신은 블랙박스 (외부 발급기 또는 fixtures)
//!    - 서버는 `Authorization: Bearer <token>` → principal 해석만 수행
//!    - 해석 실패는 모든 엔드포인트에서 일괄 401
//!
//! Q: 왜 전역 current-user 대신 extractor인가?
//! A: principal을 항상 명시적 인자로 전달하기 위함
//!    - 핸들러 시그니처에 `Principal`이 있으면 그 엔드포인트는 인증 필수
//!    - ambient 상태가 없어 테스트에서 principal 주입이 자명해짐

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::ApiError;
use crate::AppState;

/// 인증된 요청 주체
///
/// 요청 수명 동안 불변. 모든 Guard/Intake 호출에 명시적으로 전달됨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        state
            .db
            .find_principal_by_token(token)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}
