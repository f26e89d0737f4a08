//! Study API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::fixtures;
use common::TestContext;
use srs_core::{ItemKey, StoreChange};

fn keys(body: &serde_json::Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// Test study queue is empty when nothing has been studied.
#[tokio::test]
async fn test_study_queue_empty() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/study/queue").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["due_count"], 0);
}

/// Test study queue lists due items, most overdue first.
#[tokio::test]
async fn test_study_queue_orders_by_due_time() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/study/queue").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(keys(&body), vec!["2", "1"]);
    assert_eq!(body["items"][0]["item"]["content"], "가족");
    assert_eq!(body["due_count"], 2);
}

/// Test the limit caps the items but not the due count.
#[tokio::test]
async fn test_study_queue_respects_limit() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/study/queue?limit=1").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(keys(&body), vec!["2"]);
    assert_eq!(body["due_count"], 2);
}

/// Test a passing review on the second repetition schedules six days out.
#[tokio::test]
async fn test_submit_review() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/review")
        .json(&fixtures::review_request("2", 4))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["state"]["interval"], 6.0);
    assert_eq!(body["state"]["repetitions"], 2);
    assert_eq!(body["state"]["ease_factor"], 2.5);
    assert_eq!(
        body["state"]["next_review_at"],
        (fixtures::start() + Duration::days(6)).timestamp_millis()
    );
    assert_eq!(body["next_due"], "2023-11-20T22:13:20Z");

    assert_eq!(
        ctx.changes(),
        vec![StoreChange::Reviewed {
            key: ItemKey::from_id(2)
        }]
    );
}

/// Test out-of-range grades are clamped, not rejected.
#[tokio::test]
async fn test_submit_review_clamps_grade() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/review")
        .json(&fixtures::review_request("바다", 9))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["state"]["interval"], 1.0);
    assert_eq!(body["state"]["repetitions"], 1);
    assert_eq!(body["state"]["ease_factor"], 2.6);
}

/// Test a blank key is rejected.
#[tokio::test]
async fn test_submit_review_blank_key() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/review")
        .json(&fixtures::review_request("  ", 3))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "bad_request");
    assert!(ctx.changes().is_empty());
}

/// Test a request without a grade never reaches the engine.
#[tokio::test]
async fn test_submit_review_missing_grade() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/review")
        .json(&json!({ "key": "1" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.changes().is_empty());
}

/// Test preview reports fail/hard/easy intervals and commits nothing.
#[tokio::test]
async fn test_preview_intervals() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/study/preview/1").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // Six days and an hour have elapsed against a six-day interval.
    assert_eq!(body, json!({ "fail": 1.0, "hard": 7.0, "easy": 20.0 }));

    let item: serde_json::Value = server.get("/api/items/1").await.json();
    assert_eq!(item["history"]["schedule"]["repetitions"], 2);
    assert!(ctx.changes().is_empty());
}

/// Test preview for a never-seen key uses the seed schedule.
#[tokio::test]
async fn test_preview_unknown_key() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/study/preview/사랑").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "fail": 1.0, "hard": 1.0, "easy": 1.0 }));
}

/// Test a wrong answer on a scheduled item lapses it and keeps it due.
#[tokio::test]
async fn test_record_wrong_attempt_lapses_item() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/attempt")
        .json(&fixtures::attempt_request("2", false))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["attempts"], 2);
    assert_eq!(body["correct"], 1);
    assert_eq!(body["schedule"]["repetitions"], 0);
    assert_eq!(body["schedule"]["interval"], 1.0);
    assert_eq!(
        body["schedule"]["next_review_at"],
        fixtures::start().timestamp_millis()
    );

    let queue: serde_json::Value = server.get("/api/study/queue").await.json();
    assert_eq!(keys(&queue), vec!["1", "2"]);
}

/// Test a first attempt creates history and puts the item at the front.
#[tokio::test]
async fn test_record_attempt_on_new_item() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/study/attempt")
        .json(&fixtures::attempt_request("바다", true))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["attempts"], 1);
    assert_eq!(body["correct"], 1);
    assert!(body.get("schedule").is_none());

    let queue: serde_json::Value = server.get("/api/study/queue").await.json();
    assert_eq!(keys(&queue), vec!["바다", "2", "1"]);
    assert_eq!(
        ctx.changes(),
        vec![StoreChange::Attempted {
            key: ItemKey::from_content("바다")
        }]
    );
}

/// Test a full session: clear the queue, then wait for the next item to come due.
#[tokio::test]
async fn test_study_session() {
    let ctx = TestContext::with_store(fixtures::mixed_store());
    let server = TestServer::new(ctx.router()).unwrap();

    let queue: serde_json::Value = server.get("/api/study/queue").await.json();
    for key in keys(&queue) {
        server
            .post("/api/study/review")
            .json(&fixtures::review_request(&key, 4))
            .await
            .assert_status_ok();
    }

    let queue: serde_json::Value = server.get("/api/study/queue").await.json();
    assert_eq!(queue["due_count"], 0);

    // Item 2 comes back after six days, item 3 after seven, item 1 not yet.
    ctx.advance(Duration::days(7));
    let queue: serde_json::Value = server.get("/api/study/queue").await.json();
    assert_eq!(keys(&queue), vec!["2", "3"]);
    assert_eq!(ctx.changes().len(), 2);
    assert_eq!(ctx.now(), fixtures::start() + Duration::days(7));
}
