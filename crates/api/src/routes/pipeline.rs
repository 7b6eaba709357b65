//! Route definitions for the `/pipeline` resource.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::pipeline;
use crate::state::AppState;

/// Routes mounted at `/pipeline`.
///
/// ```text
/// GET    /                    -> list_board
/// POST   /                    -> add_venue
/// GET    /history             -> list_history
/// GET    /stream              -> stream (SSE)
/// POST   /bulk-status         -> bulk_status
/// PATCH  /{id}                -> update_record
/// DELETE /{id}                -> delete_record (requires confirm)
/// GET    /{id}/actions        -> record_actions
/// POST   /{id}/send-email     -> send_email
/// POST   /{id}/restore        -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pipeline::list_board).post(pipeline::add_venue))
        .route("/history", get(pipeline::list_history))
        .route("/stream", get(pipeline::stream))
        .route("/bulk-status", post(pipeline::bulk_status))
        .route("/{id}", patch(pipeline::update_record).delete(pipeline::delete_record))
        .route("/{id}/actions", get(pipeline::record_actions))
        .route("/{id}/send-email", post(pipeline::send_email))
        .route("/{id}/restore", post(pipeline::restore))
}
