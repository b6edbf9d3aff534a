//! Route definitions for the `/user` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// GET /subscription -> subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/subscription", get(user::subscription))
}
