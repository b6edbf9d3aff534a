pub mod contracts;
pub mod health;
pub mod reminders;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /contracts                       list, create
/// /contracts/upload                create from an uploaded document
/// /contracts/{id}                  get, update, delete
/// /contracts/{id}/renew            mark renewed (POST)
///
/// /reminders                       list (?pending=true)
/// /reminders/dispatch              run a dispatch cycle (GET, POST; scheduler only)
///
/// /user/subscription               caller's plan and contract usage
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/contracts", contracts::router())
        .nest("/reminders", reminders::router())
        .nest("/user", user::router())
}
