//! 기능 테스트 하네스
//!
//! 임시 SQLite 파일 위에 실제 라우터를 올리고 tower::oneshot으로 요청을 보냄

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use personal_finance_api::config::{Config, Environment};
use personal_finance_api::db::Fixtures;
use personal_finance_api::{create_router, AppState, Database};

pub struct TestApp {
    pub state: AppState,
    router: Router,
    // 테스트 종료까지 DB 파일 유지
    _tmp: TempDir,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let tmp = TempDir::new().expect("temp dir");
        let database_url = format!("sqlite://{}", tmp.path().join("test.db").display());

        let db = Database::connect(&database_url).await.expect("connect");
        db.run_migrations().await.expect("migrations");

        let config = Config {
            port: 0,
            database_url,
            environment: Environment::Development,
        };

        let state = AppState {
            db: Arc::new(db),
            config: Arc::new(config),
        };

        TestApp {
            router: create_router(state.clone()),
            state,
            _tmp: tmp,
        }
    }

    pub fn fixtures(&self) -> Fixtures<'_> {
        Fixtures::new(&self.state.db)
    }

    /// 요청 전송. body가 있으면 JSON으로 직렬화
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };

        (status, json)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request("DELETE", path, Some(token), None).await
    }
}
