//! 직불 카드 엔드포인트 기능 테스트

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn customer_can_see_a_list_of_debit_cards() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    for _ in 0..3 {
        app.fixtures().debit_card(user.id).await.unwrap();
    }

    let (status, body) = app.get("/debit-cards", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn customer_cannot_see_other_customers_debit_cards() {
    let app = TestApp::spawn().await;
    let (_user, token) = app.fixtures().user_with_token().await.unwrap();
    let other = app.fixtures().user().await.unwrap();
    for _ in 0..2 {
        app.fixtures().debit_card(other.id).await.unwrap();
    }

    let (status, body) = app.get("/debit-cards", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn customer_can_create_a_debit_card() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();

    let (status, body) = app.post("/debit-cards", &token, json!({"type": "gpn"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "gpn");
    assert_eq!(body["is_active"], true);

    // 번호 미지정 → 16자리 번호가 생성됨
    let number = body["number"].as_str().unwrap();
    assert_eq!(number.len(), 16);
    assert!(number.bytes().all(|b| b.is_ascii_digit()));

    let card = app
        .state
        .db
        .find_live_debit_card(body["id"].as_i64().unwrap())
        .await
        .unwrap()
        .expect("card persisted");
    assert_eq!(card.user_id, user.id);
}

#[tokio::test]
async fn customer_can_see_a_single_debit_card_details() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();

    let (status, body) = app.get(&format!("/debit-cards/{}", card.id), &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], card.id);
    assert_eq!(body["type"], card.card_type);
    assert_eq!(body["number"], card.number);
    assert_eq!(body["is_active"], card.is_active);
}

#[tokio::test]
async fn customer_cannot_see_other_customers_debit_card_details() {
    let app = TestApp::spawn().await;
    let (_user, token) = app.fixtures().user_with_token().await.unwrap();
    let other = app.fixtures().user().await.unwrap();
    let card = app.fixtures().debit_card(other.id).await.unwrap();

    let (status, _) = app.get(&format!("/debit-cards/{}", card.id), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_can_activate_a_debit_card() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().inactive_debit_card(user.id).await.unwrap();

    let (status, body) = app
        .put(&format!("/debit-cards/{}", card.id), &token, json!({"is_active": true}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);

    let stored = app.state.db.find_debit_card_any(card.id).await.unwrap().unwrap();
    assert!(stored.is_active);
    assert!(stored.disabled_at.is_none());
}

#[tokio::test]
async fn customer_can_deactivate_a_debit_card() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();

    let (status, body) = app
        .put(&format!("/debit-cards/{}", card.id), &token, json!({"is_active": false}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let stored = app.state.db.find_debit_card_any(card.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert!(stored.disabled_at.is_some());
}

#[tokio::test]
async fn customer_cannot_update_a_debit_card_with_wrong_validation() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();

    let (status, body) = app
        .put(&format!("/debit-cards/{}", card.id), &token, json!({"is_active": "invalid"}))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["is_active"].is_array());
}

#[tokio::test]
async fn customer_can_delete_a_debit_card() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();

    let (status, _) = app.delete(&format!("/debit-cards/{}", card.id), &token).await;

    assert_eq!(status, StatusCode::NO_CONTENT);

    // tombstone만 찍히고 레코드는 남음
    let stored = app.state.db.find_debit_card_any(card.id).await.unwrap().unwrap();
    assert!(stored.deleted_at.is_some());
    assert!(app.state.db.find_live_debit_card(card.id).await.unwrap().is_none());
}

#[tokio::test]
async fn customer_cannot_delete_a_debit_card_with_transaction() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();
    app.fixtures().transaction(card.id).await.unwrap();

    let (status, _) = app.delete(&format!("/debit-cards/{}", card.id), &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = app.state.db.find_debit_card_any(card.id).await.unwrap().unwrap();
    assert!(stored.deleted_at.is_none());
}

#[tokio::test]
async fn activating_a_second_card_leaves_the_first_untouched() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card1 = app.fixtures().debit_card(user.id).await.unwrap();
    let card2 = app.fixtures().inactive_debit_card(user.id).await.unwrap();

    let (status, _) = app
        .put(&format!("/debit-cards/{}", card2.id), &token, json!({"is_active": true}))
        .await;

    assert_eq!(status, StatusCode::OK);

    // 활성화는 카드별 토글: card1은 건드리지 않으므로 둘 다 active가 될 수 있음
    let stored1 = app.state.db.find_debit_card_any(card1.id).await.unwrap().unwrap();
    let stored2 = app.state.db.find_debit_card_any(card2.id).await.unwrap().unwrap();
    assert!(stored1.is_active);
    assert!(stored2.is_active);
}

#[tokio::test]
async fn cannot_create_debit_card_with_duplicate_number() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let number = "1234567890123456";
    app.fixtures().debit_card_with_number(user.id, number).await.unwrap();

    let (status, body) = app
        .post("/debit-cards", &token, json!({"type": "gpn", "number": number}))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["number"].is_array());
}

#[tokio::test]
async fn tombstoned_card_number_can_be_reused() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let number = "1234567890123456";
    let card = app.fixtures().debit_card_with_number(user.id, number).await.unwrap();
    let card_id = match card {
        personal_finance_api::db::CardCreateOutcome::Created(card) => card.id,
        other => panic!("fixture card rejected: {:?}", other),
    };

    let (status, _) = app.delete(&format!("/debit-cards/{}", card_id), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .post("/debit-cards", &token, json!({"type": "visa", "number": number}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn card_number_must_be_sixteen_digits() {
    let app = TestApp::spawn().await;
    let (_user, token) = app.fixtures().user_with_token().await.unwrap();

    let (status, body) = app
        .post("/debit-cards", &token, json!({"type": "gpn", "number": "1234"}))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["number"].is_array());
}

#[tokio::test]
async fn create_debit_card_requires_a_type() {
    let app = TestApp::spawn().await;
    let (_user, token) = app.fixtures().user_with_token().await.unwrap();

    let (status, body) = app.post("/debit-cards", &token, json!({})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["type"].is_array());
}

#[tokio::test]
async fn soft_deleted_cards_are_not_returned() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();

    app.delete(&format!("/debit-cards/{}", card.id), &token).await;

    let (status, body) = app.get("/debit-cards", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|entry| entry["id"] != card.id));
}

#[tokio::test]
async fn tombstoned_card_is_gone_for_every_operation() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();
    let card = app.fixtures().debit_card(user.id).await.unwrap();
    app.delete(&format!("/debit-cards/{}", card.id), &token).await;

    let path = format!("/debit-cards/{}", card.id);
    let (status, _) = app.get(&path, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put(&path, &token, json!({"is_active": true})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&path, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unauthenticated_user_cannot_access_debit_cards() {
    let app = TestApp::spawn().await;

    let (status, _) = app.request("GET", "/debit-cards", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/debit-cards", "not-a-real-token").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customer_cannot_update_other_users_card() {
    let app = TestApp::spawn().await;
    let (_user, token) = app.fixtures().user_with_token().await.unwrap();
    let other = app.fixtures().user().await.unwrap();
    let card = app.fixtures().debit_card(other.id).await.unwrap();

    // 소유권 검사가 body 검증보다 먼저: 엉뚱한 payload여도 403
    let (status, _) = app
        .put(&format!("/debit-cards/{}", card.id), &token, json!({"type": "visa"}))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn toggling_activity_to_current_value_is_idempotent() {
    let app = TestApp::spawn().await;
    let (user, token) = app.fixtures().user_with_token().await.unwrap();

    // active 카드: 다시 활성화해도 disabled_at은 NULL 그대로
    let active = app.fixtures().debit_card(user.id).await.unwrap();
    let (status, _) = app
        .put(&format!("/debit-cards/{}", active.id), &token, json!({"is_active": true}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let stored = app.state.db.find_debit_card_any(active.id).await.unwrap().unwrap();
    assert!(stored.disabled_at.is_none());

    // inactive 카드: 다시 비활성화해도 기존 disabled_at 유지
    let inactive = app.fixtures().inactive_debit_card(user.id).await.unwrap();
    let before = inactive.disabled_at.expect("disabled_at set");
    let (status, _) = app
        .put(&format!("/debit-cards/{}", inactive.id), &token, json!({"is_active": false}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let stored = app.state.db.find_debit_card_any(inactive.id).await.unwrap().unwrap();
    assert_eq!(stored.disabled_at, Some(before));
}
