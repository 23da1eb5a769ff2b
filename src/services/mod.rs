//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `ownership`: 소유권 판정 (Ownership Guard)
//! - `card_rules`: 카드 상태 전이 불변식 (Card Invariant Engine)
//! - `transaction_intake`: 거래 생성 오케스트레이션 (Transaction Intake)

pub mod card_rules;
pub mod ownership;
pub mod transaction_intake;
