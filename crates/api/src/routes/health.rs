//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether a document extraction service is configured for uploads.
    pub extraction_configured: bool,
    /// Whether a scheduler can authenticate to the dispatch endpoint.
    pub scheduler_configured: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = dealping_db::health_check(&state.pool).await.is_ok();
    let config = &state.config;

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        extraction_configured: config.extraction_url.is_some(),
        scheduler_configured: config.cron_secret.is_some() || config.trust_scheduler_header,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
