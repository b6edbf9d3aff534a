//! Route definitions for the `/reminders` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reminders;
use crate::state::AppState;

/// Routes mounted at `/reminders`.
///
/// ```text
/// GET  /           -> list      (?pending=true)
/// GET  /dispatch   -> dispatch  (pull-style scheduler)
/// POST /dispatch   -> dispatch  (push-style scheduler)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reminders::list))
        .route(
            "/dispatch",
            get(reminders::dispatch).post(reminders::dispatch),
        )
}
