//! Handlers for the `/reminders` resource and the dispatch endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use dealping_db::models::reminder::Reminder;
use dealping_db::repositories::ReminderRepo;
use dealping_events::{DispatchSummary, PgReminderLedger, ReminderDispatcher};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::scheduler::SchedulerAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for listing reminders.
#[derive(Debug, Default, Deserialize)]
pub struct ReminderListParams {
    /// Only return unsent reminders.
    #[serde(default)]
    pub pending: bool,
}

/// Body returned by the dispatch endpoint.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: DispatchSummary,
}

/// GET /api/v1/reminders?pending=true
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReminderListParams>,
) -> AppResult<Json<DataResponse<Vec<Reminder>>>> {
    let reminders = ReminderRepo::list_for_user(&state.pool, auth.user_id, params.pending).await?;
    Ok(Json(DataResponse { data: reminders }))
}

/// GET|POST /api/v1/reminders/dispatch
///
/// Runs one dispatch cycle. Only trusted schedulers get this far; the
/// [`SchedulerAuth`] extractor rejects everyone else before the ledger is
/// touched.
pub async fn dispatch(
    _scheduler: SchedulerAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DispatchResponse>> {
    let dispatcher = ReminderDispatcher::new(
        PgReminderLedger::new(state.pool.clone()),
        Arc::clone(&state.notifier),
    )
    .with_notify_timeout(Duration::from_secs(
        state.config.dispatch_notify_timeout_secs,
    ));

    let summary = dispatcher.run_cycle(Utc::now()).await?;

    Ok(Json(DispatchResponse {
        success: true,
        summary,
    }))
}
