//! Extractor that admits only trusted schedulers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dealping_core::error::CoreError;

use crate::auth::scheduler::{is_trusted_scheduler, SCHEDULER_HEADER};
use crate::error::AppError;
use crate::state::AppState;

/// Marker extractor for the dispatch endpoint.
///
/// Rejects with 401 before the handler runs, so an unauthorised caller
/// never reaches the reminder ledger.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerAuth;

impl FromRequestParts<AppState> for SchedulerAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if is_trusted_scheduler(
            header(parts, "authorization"),
            header(parts, SCHEDULER_HEADER),
            state.config.cron_secret.as_deref(),
            state.config.trust_scheduler_header,
        ) {
            Ok(SchedulerAuth)
        } else {
            tracing::warn!("Rejected unauthorised dispatch request");
            Err(AppError::Core(CoreError::Unauthorized("Unauthorized".into())))
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}
