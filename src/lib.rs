//! Personal Finance API Library
//!
//! # Overview
//!
//! 이 라이브러리는 개인 금융 백엔드 API를 제공합니다.
//! 인증된 고객이 직불 카드, 카드 거래, 대출을 관리합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `auth`: Bearer 토큰 → principal 해석
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (Ownership Guard, Card Invariant Engine, Transaction Intake)
//! - `db`: 데이터베이스 연동
//! - `types`: 공통 타입 정의

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use auth::Principal;
pub use config::Config;
pub use db::Database;
pub use error::ApiError;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET    /health                        - 서버 상태 확인
///
/// GET    /debit-cards                   - 카드 목록
/// POST   /debit-cards                   - 카드 생성
/// GET    /debit-cards/:id               - 카드 상세
/// PUT    /debit-cards/:id               - 활성화 토글
/// DELETE /debit-cards/:id               - soft delete
///
/// GET    /debit-card-transactions       - 거래 목록
/// POST   /debit-card-transactions       - 거래 생성
/// GET    /debit-card-transactions/:id   - 거래 상세
///
/// GET    /loans                         - 대출 목록
/// GET    /loans/:id                     - 대출 상세 (상환 스케줄 포함)
/// ```
pub fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 특정 도메인만 허용, 개발 환경에서는 localhost 허용
    use tower_http::cors::AllowOrigin;

    let cors = if state.config.is_production() {
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://yourdomain.com".to_string());
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
    } else {
        // 개발: localhost 허용
        CorsLayer::new()
            .allow_origin([
                "http://localhost:5173".parse().unwrap(),  // Vite dev server
                "http://localhost:3000".parse().unwrap(),  // Alternative
                "http://127.0.0.1:5173".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Debit cards
        .route(
            "/debit-cards",
            get(routes::debit_card::list_cards).post(routes::debit_card::create_card),
        )
        .route(
            "/debit-cards/:id",
            get(routes::debit_card::card_detail)
                .put(routes::debit_card::update_card)
                .delete(routes::debit_card::delete_card),
        )

        // Debit card transactions
        .route(
            "/debit-card-transactions",
            get(routes::debit_card_transaction::list_transactions)
                .post(routes::debit_card_transaction::create_transaction),
        )
        .route(
            "/debit-card-transactions/:id",
            get(routes::debit_card_transaction::transaction_detail),
        )

        // Loans
        .route("/loans", get(routes::loan::list_loans))
        .route("/loans/:id", get(routes::loan::loan_detail))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
