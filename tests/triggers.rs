mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{test_state, FakeMailer, FakeStore};
use equilibrius_notify::build_router;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn sweep_without_secret_is_rejected_before_any_work() {
    let user = Uuid::new_v4();
    let store = Arc::new(
        FakeStore::default()
            .with_user(user, "ana@example.com", None)
            .with_contact(user, "Bia", "bia@example.com"),
    );
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), "topsecret"));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/check-mood")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.mood_queries.load(Ordering::SeqCst), 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sweep_with_wrong_secret_is_rejected() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer, "topsecret"));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/check-mood")
                .header("X-Cron-Secret", "not-the-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.mood_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sweep_with_the_secret_runs_and_reports_a_summary() {
    let user = Uuid::new_v4();
    let store = Arc::new(
        FakeStore::default()
            .with_user(user, "ana@example.com", None)
            .with_contact(user, "Bia", "bia@example.com"),
    );
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), "topsecret"));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/check-mood")
                .header("X-Cron-Secret", "topsecret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let summary = body_json(resp).await;
    assert_eq!(summary["candidates"], 1);
    // No entry exists for yesterday, so the one candidate was notified.
    assert_eq!(summary["users_notified"], 1);
    assert_eq!(summary["emails_sent"], 1);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_ignores_non_insert_events() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), ""));

    let payload = json!({
        "type": "UPDATE",
        "table": "mood_entries",
        "record": {
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "mood_value": 1,
            "entry_date": "2024-03-14",
        },
    });

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/mood-entry-insert")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["handled"], false);
    assert_eq!(store.mood_queries.load(Ordering::SeqCst), 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_short_circuits_on_a_fine_mood_without_touching_the_store() {
    let user = Uuid::new_v4();
    let store = Arc::new(
        FakeStore::default()
            .with_user(user, "davi@example.com", None)
            .with_contact(user, "Sofia", "sofia@example.com"),
    );
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), ""));

    let payload = json!({
        "type": "INSERT",
        "table": "mood_entries",
        "record": {
            "id": Uuid::new_v4(),
            "user_id": user,
            "mood_value": 5,
            "entry_date": "2024-03-14",
        },
    });

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/mood-entry-insert")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["handled"], false);
    assert_eq!(store.mood_queries.load(Ordering::SeqCst), 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_dispatches_for_a_low_mood_insert() {
    let user = Uuid::new_v4();
    let store = Arc::new(
        FakeStore::default()
            .with_user(user, "davi@example.com", None)
            .with_contact(user, "Sofia", "sofia@example.com")
            .with_mood(user, date(), 2),
    );
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), ""));

    let payload = json!({
        "type": "INSERT",
        "table": "mood_entries",
        "record": {
            "id": Uuid::new_v4(),
            "user_id": user,
            "mood_value": 2,
            "entry_date": "2024-03-14",
        },
    });

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/mood-entry-insert")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["handled"], true);
    assert_eq!(body["report"]["outcome"]["status"], "sent");

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "sofia@example.com");
    assert!(sent[0].html.contains("baixo (2)"));
}

#[tokio::test]
async fn webhook_rejects_a_malformed_payload() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store.clone(), mailer.clone(), ""));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/mood-entry-insert")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.mood_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn webhook_rejects_a_payload_missing_the_record() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store, mailer, ""));

    let payload = json!({ "type": "INSERT", "table": "mood_entries" });

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/mood-entry-insert")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store, mailer, ""));

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/family-members")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_answers_without_auth() {
    let store = Arc::new(FakeStore::default());
    let mailer = Arc::new(FakeMailer::default());
    let app = build_router(test_state(store, mailer, ""));

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["service"], "equilibrius-notify");
}
