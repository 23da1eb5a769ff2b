//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크 (인증 불필요)
//! - `/debit-cards` - 직불 카드 CRUD
//! - `/debit-card-transactions` - 카드 거래 조회/생성
//! - `/loans` - 대출 조회 (읽기 전용)

pub mod debit_card;
pub mod debit_card_transaction;
pub mod health;
pub mod loan;
