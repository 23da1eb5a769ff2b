//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 왜 SQLite를 선택했는가?
//! A: 단일 테넌트, 저QPS 관리용 서비스에 적합
//!
//!    1. ACID 트랜잭션: read-validate-write를 하나의 단위로 커밋
//!    2. 임베디드: 외부 DB 프로세스 없이 테스트/배포 가능
//!    3. 생태계: SQLx가 동일한 API로 지원 (Postgres 전환 시 쿼리만 이식)
//!
//! Q: Soft delete 필터는 어떻게 누락을 방지하는가?
//! A: 하나의 SQL 조각 상수(`CARD_IS_LIVE`)를 모든 읽기 경로가 재사용
//!    - 새 쿼리를 추가할 때 ad hoc으로 WHERE를 다시 쓰지 않음
//!    - "필터를 깜빡한 새 조회 경로" 류의 버그를 구조적으로 차단
//!
//! Q: 불변식 검사와 쓰기 사이의 race는?
//! A: 변경 연산은 전부 SQL 트랜잭션 안에서 재조회 → 검증 → 쓰기
//!    - 검증은 순수 함수(`card_rules`)에 위임, 결정만 받아옴
//!    - 동시 삭제/거래 생성이 교차해도 불변식이 깨진 채 커밋되지 않음

mod fixtures;
mod models;

pub use fixtures::Fixtures;
pub use models::*;

use anyhow::{bail, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::auth::Principal;
use crate::services::card_rules::{self, CardState, CardTransition, Violation};
use crate::types::CardNumber;

/// 모든 카드 읽기 경로가 적용해야 하는 liveness 필터
///
/// 조인 쿼리에서도 그대로 쓸 수 있도록 테이블 한정자를 포함
const CARD_IS_LIVE: &str = "debit_cards.deleted_at IS NULL";

/// 카드 생성 결과
#[derive(Debug)]
pub enum CardCreateOutcome {
    Created(DebitCard),
    /// 요청된 번호가 live 카드와 충돌
    NumberTaken,
}

/// 카드 활성화 토글 결과
#[derive(Debug)]
pub enum CardUpdateOutcome {
    Updated(DebitCard),
    /// 트랜잭션 안에서 재조회했더니 카드가 사라짐
    Gone,
}

/// 카드 삭제 결과
#[derive(Debug)]
pub enum CardDeleteOutcome {
    Deleted,
    HasTransactions,
    Gone,
}

/// 거래 생성 결과
#[derive(Debug)]
pub enum TransactionCreateOutcome {
    Created(DebitCardTransaction),
    CardInactive,
    CardGone,
}

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 5 (임베디드 DB, 쓰기는 단일 writer)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ============ Principals & Tokens ============

    /// Bearer 토큰을 principal로 해석
    pub async fn find_principal_by_token(&self, token: &str) -> Result<Option<Principal>> {
        let user_id: Option<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM api_tokens WHERE token = ?"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(|(id,)| Principal { id }))
    }

    /// 토큰 발급 (발급 정책 자체는 블랙박스: fixtures/운영 도구가 호출)
    pub async fn issue_token(&self, user_id: i64) -> Result<String> {
        let token = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO api_tokens (token, user_id, created_at) VALUES (?, ?, ?)"
        )
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    pub async fn create_user(&self, name: &str, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES (?, ?, ?)
            RETURNING id, name, email, created_at
            "#
        )
        .bind(name)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    // ============ Debit Cards ============

    /// Principal 소유의 live 카드 목록
    pub async fn list_debit_cards(&self, user_id: i64) -> Result<Vec<DebitCard>> {
        let sql = format!(
            r#"
            SELECT id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            FROM debit_cards
            WHERE user_id = ? AND {CARD_IS_LIVE}
            ORDER BY id
            "#
        );

        let cards = sqlx::query_as::<_, DebitCard>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(cards)
    }

    /// live 카드 단건 조회 (tombstone 된 카드는 존재하지 않는 것으로 취급)
    pub async fn find_live_debit_card(&self, card_id: i64) -> Result<Option<DebitCard>> {
        let sql = format!(
            r#"
            SELECT id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            FROM debit_cards
            WHERE id = ? AND {CARD_IS_LIVE}
            "#
        );

        let card = sqlx::query_as::<_, DebitCard>(&sql)
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    /// Tombstone 포함 단건 조회 (soft delete 검증용)
    pub async fn find_debit_card_any(&self, card_id: i64) -> Result<Option<DebitCard>> {
        let card = sqlx::query_as::<_, DebitCard>(
            r#"
            SELECT id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            FROM debit_cards
            WHERE id = ?
            "#
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// 카드 생성
    ///
    /// 번호가 명시되면 live 카드들과의 충돌을 트랜잭션 안에서 검사,
    /// 없으면 유일한 번호를 생성. 신규 카드는 active 상태로 시작
    pub async fn create_debit_card(
        &self,
        user_id: i64,
        card_type: &str,
        number: Option<CardNumber>,
    ) -> Result<CardCreateOutcome> {
        let mut tx = self.pool.begin().await?;

        let taken_sql = format!(
            "SELECT COUNT(*) FROM debit_cards WHERE number = ? AND {CARD_IS_LIVE}"
        );

        let number = match number {
            Some(number) => {
                let (taken,): (i64,) = sqlx::query_as(&taken_sql)
                    .bind(number.as_str())
                    .fetch_one(&mut *tx)
                    .await?;
                if taken > 0 {
                    return Ok(CardCreateOutcome::NumberTaken);
                }
                number
            }
            None => {
                // 충돌 시 재시도. live 카드 수 대비 공간이 크므로 사실상 1회에 끝남
                let mut generated = None;
                for _ in 0..8 {
                    let candidate = CardNumber::generate();
                    let (taken,): (i64,) = sqlx::query_as(&taken_sql)
                        .bind(candidate.as_str())
                        .fetch_one(&mut *tx)
                        .await?;
                    if taken == 0 {
                        generated = Some(candidate);
                        break;
                    }
                }
                match generated {
                    Some(number) => number,
                    None => bail!("could not allocate a unique card number"),
                }
            }
        };

        let card = sqlx::query_as::<_, DebitCard>(
            r#"
            INSERT INTO debit_cards (user_id, type, number, is_active, disabled_at, created_at, deleted_at)
            VALUES (?, ?, ?, 1, NULL, ?, NULL)
            RETURNING id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            "#
        )
        .bind(user_id)
        .bind(card_type)
        .bind(number.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CardCreateOutcome::Created(card))
    }

    /// 카드 활성화/비활성화 토글
    ///
    /// 현재 값으로의 토글은 no-op 성공이며 disabled_at을 건드리지 않음
    pub async fn set_card_active(
        &self,
        card_id: i64,
        is_active: bool,
    ) -> Result<CardUpdateOutcome> {
        let mut tx = self.pool.begin().await?;

        let card = match Self::fetch_live_card(&mut tx, card_id).await? {
            Some(card) => card,
            None => return Ok(CardUpdateOutcome::Gone),
        };

        let transition = if is_active {
            CardTransition::Activate
        } else {
            CardTransition::Deactivate
        };

        if card_rules::validate_transition(card.state(), transition, 0).is_err() {
            return Ok(CardUpdateOutcome::Gone);
        }

        if card.is_active == is_active {
            // 멱등 no-op
            return Ok(CardUpdateOutcome::Updated(card));
        }

        let disabled_at = if is_active { None } else { Some(Utc::now()) };

        let updated = sqlx::query_as::<_, DebitCard>(
            r#"
            UPDATE debit_cards
            SET is_active = ?, disabled_at = ?
            WHERE id = ?
            RETURNING id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            "#
        )
        .bind(is_active)
        .bind(disabled_at)
        .bind(card_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CardUpdateOutcome::Updated(updated))
    }

    /// 카드 soft delete
    ///
    /// 거래 수 집계와 tombstone 쓰기가 같은 트랜잭션에서 일어나므로
    /// 동시 거래 생성과 교차해도 불변식이 유지됨
    pub async fn soft_delete_card(&self, card_id: i64) -> Result<CardDeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let card = match Self::fetch_live_card(&mut tx, card_id).await? {
            Some(card) => card,
            None => return Ok(CardDeleteOutcome::Gone),
        };

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM debit_card_transactions WHERE debit_card_id = ?"
        )
        .bind(card_id)
        .fetch_one(&mut *tx)
        .await?;

        match card_rules::validate_transition(card.state(), CardTransition::Delete, count) {
            Ok(()) => {}
            Err(Violation::HasDependentTransactions) => {
                return Ok(CardDeleteOutcome::HasTransactions);
            }
            Err(Violation::CardDeleted) => return Ok(CardDeleteOutcome::Gone),
        }

        sqlx::query("UPDATE debit_cards SET deleted_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(card_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CardDeleteOutcome::Deleted)
    }

    // ============ Debit Card Transactions ============

    /// Principal 소유 live 카드들의 거래 목록
    pub async fn list_transactions_for_user(&self, user_id: i64) -> Result<Vec<DebitCardTransaction>> {
        let sql = format!(
            r#"
            SELECT t.id, t.debit_card_id, t.amount, t.currency_code, t.type, t.created_at
            FROM debit_card_transactions t
            JOIN debit_cards ON debit_cards.id = t.debit_card_id
            WHERE debit_cards.user_id = ? AND {CARD_IS_LIVE}
            ORDER BY t.id
            "#
        );

        let transactions = sqlx::query_as::<_, DebitCardTransaction>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(transactions)
    }

    /// 거래 단건 조회. 부모 카드가 tombstone이면 존재하지 않는 것으로 취급
    pub async fn find_transaction(&self, transaction_id: i64) -> Result<Option<DebitCardTransaction>> {
        let sql = format!(
            r#"
            SELECT t.id, t.debit_card_id, t.amount, t.currency_code, t.type, t.created_at
            FROM debit_card_transactions t
            JOIN debit_cards ON debit_cards.id = t.debit_card_id
            WHERE t.id = ? AND {CARD_IS_LIVE}
            "#
        );

        let transaction = sqlx::query_as::<_, DebitCardTransaction>(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    /// 거래 생성
    ///
    /// 카드의 live/active 상태를 트랜잭션 안에서 재검증하고 삽입.
    /// 소유권 검사는 호출부(Transaction Intake)에서 이미 끝난 상태
    pub async fn create_transaction(
        &self,
        card_id: i64,
        amount: i64,
        currency_code: &str,
        transaction_type: &str,
    ) -> Result<TransactionCreateOutcome> {
        let mut tx = self.pool.begin().await?;

        let card = match Self::fetch_live_card(&mut tx, card_id).await? {
            Some(card) => card,
            None => return Ok(TransactionCreateOutcome::CardGone),
        };

        match card.state() {
            CardState::Active => {}
            CardState::Inactive => return Ok(TransactionCreateOutcome::CardInactive),
            CardState::Deleted => return Ok(TransactionCreateOutcome::CardGone),
        }

        let transaction = sqlx::query_as::<_, DebitCardTransaction>(
            r#"
            INSERT INTO debit_card_transactions (debit_card_id, amount, currency_code, type, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, debit_card_id, amount, currency_code, type, created_at
            "#
        )
        .bind(card_id)
        .bind(amount)
        .bind(currency_code)
        .bind(transaction_type)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(TransactionCreateOutcome::Created(transaction))
    }

    // ============ Loans & Scheduled Repayments ============

    /// 대출 생성
    ///
    /// 파생 필드는 생성 시점에 명시적으로 계산: 신규 대출의 잔여 원금은
    /// 대출 원금 전액 (숨은 훅 체인 없음)
    pub async fn create_loan(
        &self,
        user_id: i64,
        amount: i64,
        terms: i64,
        currency_code: &str,
        processed_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<Loan> {
        let outstanding_amount = amount;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, amount, terms, outstanding_amount, currency_code, processed_at, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, amount, terms, outstanding_amount, currency_code, processed_at, status, created_at
            "#
        )
        .bind(user_id)
        .bind(amount)
        .bind(terms)
        .bind(outstanding_amount)
        .bind(currency_code)
        .bind(processed_at)
        .bind(LOAN_STATUS_DUE)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(loan)
    }

    pub async fn list_loans(&self, user_id: i64) -> Result<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, user_id, amount, terms, outstanding_amount, currency_code, processed_at, status, created_at
            FROM loans
            WHERE user_id = ?
            ORDER BY id
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    pub async fn find_loan(&self, loan_id: i64) -> Result<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, user_id, amount, terms, outstanding_amount, currency_code, processed_at, status, created_at
            FROM loans
            WHERE id = ?
            "#
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// 상환 스케줄 생성 (잔여액은 생성 시점에 전액으로 계산)
    pub async fn create_scheduled_repayment(
        &self,
        loan_id: i64,
        amount: i64,
        currency_code: &str,
        due_date: chrono::DateTime<Utc>,
    ) -> Result<ScheduledRepayment> {
        let repayment = sqlx::query_as::<_, ScheduledRepayment>(
            r#"
            INSERT INTO scheduled_repayments (loan_id, amount, outstanding_amount, currency_code, due_date, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, loan_id, amount, outstanding_amount, currency_code, due_date, status, created_at
            "#
        )
        .bind(loan_id)
        .bind(amount)
        .bind(amount)
        .bind(currency_code)
        .bind(due_date)
        .bind(LOAN_STATUS_DUE)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(repayment)
    }

    pub async fn list_scheduled_repayments(&self, loan_id: i64) -> Result<Vec<ScheduledRepayment>> {
        let repayments = sqlx::query_as::<_, ScheduledRepayment>(
            r#"
            SELECT id, loan_id, amount, outstanding_amount, currency_code, due_date, status, created_at
            FROM scheduled_repayments
            WHERE loan_id = ?
            ORDER BY due_date
            "#
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(repayments)
    }

    // ============ Internal ============

    /// 트랜잭션 안에서 live 카드 재조회
    async fn fetch_live_card(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        card_id: i64,
    ) -> Result<Option<DebitCard>> {
        let sql = format!(
            r#"
            SELECT id, user_id, type, number, is_active, disabled_at, created_at, deleted_at
            FROM debit_cards
            WHERE id = ? AND {CARD_IS_LIVE}
            "#
        );

        let card = sqlx::query_as::<_, DebitCard>(&sql)
            .bind(card_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(card)
    }
}
