//! Route definitions for the `/contracts` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use dealping_core::extraction::MAX_UPLOAD_BYTES;

use crate::handlers::contracts;
use crate::state::AppState;

/// Slack for multipart framing on top of the document size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/contracts`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// POST   /upload       -> upload
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// POST   /{id}/renew   -> renew
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contracts::list).post(contracts::create))
        .route(
            "/upload",
            post(contracts::upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route(
            "/{id}",
            get(contracts::get_by_id)
                .put(contracts::update)
                .delete(contracts::delete),
        )
        .route("/{id}/renew", post(contracts::renew))
}
