//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use dealping_api::auth::jwt::{Claims, JwtConfig};
use dealping_api::config::ServerConfig;
use dealping_api::extraction::{ContractExtractor, ExtractionError};
use dealping_api::router::build_app_router;
use dealping_api::state::AppState;
use dealping_api::storage::FileStore;
use dealping_core::extraction::DocumentKind;
use dealping_events::{NotifyError, ReminderNotice, ReminderNotifier};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-long-enough";
pub const CRON_SECRET: &str = "integration-cron-secret";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Notifier that records every notice instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub delivered: Mutex<Vec<(String, ReminderNotice)>>,
}

#[async_trait]
impl ReminderNotifier for RecordingNotifier {
    async fn notify(&self, to: &str, notice: &ReminderNotice) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .unwrap()
            .push((to.to_string(), notice.clone()));
        Ok(())
    }
}

/// Extractor that answers every document with the same JSON.
pub struct CannedExtractor(pub serde_json::Value);

#[async_trait]
impl ContractExtractor for CannedExtractor {
    async fn extract(
        &self,
        _file_name: &str,
        _kind: DocumentKind,
        _bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ExtractionError> {
        Ok(self.0.clone())
    }
}

/// Extractor whose service is always down.
pub struct FailingExtractor;

#[async_trait]
impl ContractExtractor for FailingExtractor {
    async fn extract(
        &self,
        _file_name: &str,
        _kind: DocumentKind,
        _bytes: Vec<u8>,
    ) -> Result<serde_json::Value, ExtractionError> {
        Err(ExtractionError::HttpStatus(503))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        cron_secret: Some(CRON_SECRET.to_string()),
        trust_scheduler_header: false,
        dispatch_notify_timeout_secs: 5,
        // Replaced with a fresh temporary directory by `build_app`.
        upload_dir: PathBuf::new(),
        extraction_url: None,
    }
}

/// Everything a test may want to inspect after driving the app.
pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    /// Storage root; deleted when the `TestApp` is dropped.
    pub upload_dir: TempDir,
}

/// Build the app with explicit config and extractor. Uploads go to a
/// temporary directory owned by the returned `TestApp`.
pub fn build_app(
    pool: PgPool,
    mut config: ServerConfig,
    extractor: Arc<dyn ContractExtractor>,
) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let upload_dir = TempDir::new().unwrap();
    config.upload_dir = upload_dir.path().to_path_buf();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifier: notifier.clone(),
        extractor,
        files: FileStore::new(config.upload_dir.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        notifier,
        upload_dir,
    }
}

/// Build the full application router, with the production middleware
/// stack, on the given pool.
///
/// The upload directory is removed on return; tests that store files use
/// [`build_app`] and keep the `TestApp` alive.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(
        pool,
        test_config(),
        Arc::new(CannedExtractor(serde_json::json!({}))),
    )
    .router
}

/// Sign a token the way the auth provider would for an external user id.
pub fn token_for(subject: &str, email: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        email: email.map(str::to_string),
        name: None,
        exp: now + 15 * 60,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_as(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_as(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::put(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_as(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Upload a single `file` field as multipart/form-data.
pub async fn upload_as(
    app: Router,
    uri: &str,
    token: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "dealping-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
