//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use rand::Rng;

/// 인식되는 카드 타입
pub const CARD_TYPES: &[&str] = &["gpn", "visa", "mastercard"];

/// 인식되는 거래 타입
pub const TRANSACTION_TYPES: &[&str] = &["purchase", "debit"];

/// 지원 통화 코드
pub const CURRENCIES: &[&str] = &["IDR", "SGD", "THB", "VND"];

/// 통화 미지정 시 기본값
pub const DEFAULT_CURRENCY: &str = "VND";

/// 직불 카드 번호 타입
///
/// 정확히 16자리 숫자만 허용
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn new(number: &str) -> Result<Self, String> {
        if number.len() == 16 && number.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(number.to_string()))
        } else {
            Err("The number must be exactly 16 digits".to_string())
        }
    }

    /// 무작위 16자리 번호 생성
    ///
    /// 유일성은 저장 시점에 live 카드들과 비교해서 보장 (여기서는 형식만)
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let digits: String = (0..16).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect();
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
