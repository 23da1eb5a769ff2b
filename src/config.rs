//! Configuration Module
//!
//! # Interview Q&A
//!
//! Q: 환경변수 vs 설정 파일, 어떤 방식을 선택했고 왜인가?
//! A: 환경변수를 선택
//!    - 12-Factor App 원칙 준수
//!    - Docker/K8s 배포 시 환경별 설정 분리 용이
//!    - 민감 정보(DB 경로 등)를 코드에 포함하지 않음
//!
//! Q: 설정 검증은 어떻게 하는가?
//! A: from_env()에서 필수 값 검증 → 없으면 즉시 실패 (fail-fast)
//!    - 앱 시작 시점에 모든 설정 검증
//!    - 런타임 에러보다 시작 실패가 디버깅에 유리

use std::env;
use anyhow::{Context, Result};

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3001)
    pub port: u16,

    /// SQLite 연결 문자열
    /// 형식: sqlite://path/to/finance.db
    pub database_url: String,

    /// 환경 (development, staging, production)
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Optional Environment Variables
    ///
    /// - `PORT`: 서버 포트 (기본값: 3001)
    /// - `DATABASE_URL`: SQLite 연결 문자열 (기본값: sqlite://finance.db)
    /// - `ENVIRONMENT`: development | staging | production
    pub fn from_env() -> Result<Self> {
        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    // 개발 환경 기본값
                    "sqlite://finance.db".to_string()
                }),

            environment,
        })
    }

    /// 프로덕션 환경인지 확인
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // 환경변수 없이 기본값으로 설정 생성
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.environment, Environment::Development);
    }
}
