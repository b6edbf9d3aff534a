//! HTTP-level tests for `/api/v1/reminders/dispatch`.
//!
//! Dispatch is only reachable by a trusted scheduler. These tests check the
//! rejection path leaves the ledger untouched, and that both trigger styles
//! run the same cycle.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{Duration, Utc};
use common::{
    body_json, build_app, post_json_as, send, test_config, token_for, CannedExtractor, TestApp,
    CRON_SECRET,
};
use dealping_core::types::DbId;
use dealping_db::repositories::ReminderRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_with(pool: &PgPool, trust_scheduler_header: bool) -> TestApp {
    let mut config = test_config();
    config.trust_scheduler_header = trust_scheduler_header;
    build_app(pool.clone(), config, Arc::new(CannedExtractor(json!({}))))
}

/// Create a contract ending in two days: three reminders, today's is due.
async fn seed_contract(pool: &PgPool, subject: &str) -> DbId {
    let email = format!("{subject}@example.com");
    let token = token_for(subject, Some(email.as_str()));
    let today = Utc::now().date_naive();
    let response = post_json_as(
        common::build_test_app(pool.clone()),
        "/api/v1/contracts",
        &token,
        json!({
            "client_name": "Dispatch Co",
            "start_date": (today - Duration::days(30)).to_string(),
            "end_date": (today + Duration::days(2)).to_string(),
            "rate": 100
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn sent_count(pool: &PgPool, contract_id: DbId) -> usize {
    ReminderRepo::list_for_contract(pool, contract_id)
        .await
        .unwrap()
        .iter()
        .filter(|r| r.sent)
        .count()
}

fn dispatch_request(method: Method, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/api/v1/reminders/dispatch");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

// ---------------------------------------------------------------------------
// Test: callers without the secret are rejected before the ledger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dispatch_without_secret_returns_401(pool: PgPool) {
    let contract_id = seed_contract(&pool, "nosecret").await;
    let app = app_with(&pool, false);

    let response = send(app.router, dispatch_request(Method::POST, &[])).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(sent_count(&pool, contract_id).await, 0);
    assert!(app.notifier.delivered.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dispatch_with_wrong_secret_returns_401(pool: PgPool) {
    let contract_id = seed_contract(&pool, "wrongsecret").await;
    let app = app_with(&pool, false);

    let response = send(
        app.router,
        dispatch_request(Method::POST, &[("authorization", "Bearer not-the-secret")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(sent_count(&pool, contract_id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_token_cannot_dispatch(pool: PgPool) {
    let token = token_for("regular_user", Some("regular@example.com"));
    let app = app_with(&pool, false);
    let auth = format!("Bearer {token}");

    let response = send(
        app.router,
        dispatch_request(Method::POST, &[("authorization", auth.as_str())]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scheduler_header_ignored_unless_trusted(pool: PgPool) {
    let app = app_with(&pool, false);

    let response = send(
        app.router,
        dispatch_request(Method::GET, &[("x-vercel-cron", "1")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: authorised triggers run the cycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_post_with_secret_sends_due_reminders(pool: PgPool) {
    let contract_id = seed_contract(&pool, "pushed").await;
    let app = app_with(&pool, false);
    let auth = format!("Bearer {CRON_SECRET}");

    let response = send(
        app.router,
        dispatch_request(Method::POST, &[("authorization", auth.as_str())]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["sent"], 1);
    assert_eq!(json["attempted"], 1);
    assert_eq!(json["skipped"], 0);
    assert_eq!(json["failed"], 0);

    assert_eq!(sent_count(&pool, contract_id).await, 1);
    let delivered = app.notifier.delivered.lock().unwrap();
    assert_eq!(delivered[0].0, "pushed@example.com");
    assert_eq!(delivered[0].1.days_until_end, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_and_post_run_the_same_cycle(pool: PgPool) {
    let contract_id = seed_contract(&pool, "pulled").await;
    let auth = format!("Bearer {CRON_SECRET}");

    let first = send(
        app_with(&pool, false).router,
        dispatch_request(Method::GET, &[("authorization", auth.as_str())]),
    )
    .await;
    assert_eq!(body_json(first).await["sent"], 1);

    // A redundant trigger finds nothing new to send.
    let second = send(
        app_with(&pool, false).router,
        dispatch_request(Method::POST, &[("authorization", auth.as_str())]),
    )
    .await;
    assert_eq!(body_json(second).await["sent"], 0);

    assert_eq!(sent_count(&pool, contract_id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trusted_scheduler_header_is_accepted(pool: PgPool) {
    let contract_id = seed_contract(&pool, "headered").await;
    let app = app_with(&pool, true);

    let response = send(
        app.router,
        dispatch_request(Method::GET, &[("x-vercel-cron", "1")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sent_count(&pool, contract_id).await, 1);
}
