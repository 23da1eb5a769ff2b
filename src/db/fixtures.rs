//! Test Fixtures
//!
//! 기능 테스트와 시드 스크립트가 쓰는 데이터 빌더.
//! 파생 필드는 전부 생성 함수에서 명시적으로 계산됨 (숨은 훅 없음)

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::Rng;

use super::{CardCreateOutcome, Database, DebitCard, DebitCardTransaction, Loan, ScheduledRepayment, User};
use crate::types::{CardNumber, CARD_TYPES, CURRENCIES, TRANSACTION_TYPES};

/// 저장소 위의 fixture 빌더
pub struct Fixtures<'a> {
    db: &'a Database,
}

impl<'a> Fixtures<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// 무작위 사용자 생성
    pub async fn user(&self) -> Result<User> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("customer-{}", &suffix[..8]);
        let email = format!("{}@example.com", &suffix[..12]);
        self.db.create_user(&name, &email).await
    }

    /// 사용자 생성 + 토큰 발급
    pub async fn user_with_token(&self) -> Result<(User, String)> {
        let user = self.user().await?;
        let token = self.db.issue_token(user.id).await?;
        Ok((user, token))
    }

    /// 무작위 타입/번호의 active 카드
    pub async fn debit_card(&self, user_id: i64) -> Result<DebitCard> {
        let card_type = pick(CARD_TYPES);
        match self.db.create_debit_card(user_id, card_type, None).await? {
            CardCreateOutcome::Created(card) => Ok(card),
            CardCreateOutcome::NumberTaken => unreachable!("generated numbers are collision-checked"),
        }
    }

    /// 번호를 지정한 카드
    pub async fn debit_card_with_number(&self, user_id: i64, number: &str) -> Result<CardCreateOutcome> {
        let number = CardNumber::new(number).map_err(anyhow::Error::msg)?;
        self.db.create_debit_card(user_id, pick(CARD_TYPES), Some(number)).await
    }

    /// 비활성 카드 (생성 직후 토글)
    pub async fn inactive_debit_card(&self, user_id: i64) -> Result<DebitCard> {
        let card = self.debit_card(user_id).await?;
        match self.db.set_card_active(card.id, false).await? {
            super::CardUpdateOutcome::Updated(card) => Ok(card),
            super::CardUpdateOutcome::Gone => unreachable!("card was just created"),
        }
    }

    /// 무작위 금액/타입의 카드 거래
    pub async fn transaction(&self, debit_card_id: i64) -> Result<DebitCardTransaction> {
        let amount = rand::thread_rng().gen_range(100..1_000_000);
        match self
            .db
            .create_transaction(debit_card_id, amount, pick(CURRENCIES), pick(TRANSACTION_TYPES))
            .await?
        {
            super::TransactionCreateOutcome::Created(transaction) => Ok(transaction),
            other => anyhow::bail!("fixture transaction rejected: {:?}", other),
        }
    }

    /// 상환 중인 대출
    pub async fn loan(&self, user_id: i64) -> Result<Loan> {
        let mut rng = rand::thread_rng();
        let amount = rng.gen_range(1_000..10_000_000);
        let terms = rng.gen_range(1..10);
        self.db
            .create_loan(user_id, amount, terms, "VND", Some(Utc::now()))
            .await
    }

    /// 대출에 달린 상환 스케줄
    pub async fn scheduled_repayment(&self, loan_id: i64) -> Result<ScheduledRepayment> {
        let mut rng = rand::thread_rng();
        let amount = rng.gen_range(1_000..1_000_000);
        let due_date = Utc::now() + Duration::days(rng.gen_range(1..365));
        self.db
            .create_scheduled_repayment(loan_id, amount, "VND", due_date)
            .await
    }
}

fn pick(values: &[&'static str]) -> &'static str {
    values[rand::thread_rng().gen_range(0..values.len())]
}
