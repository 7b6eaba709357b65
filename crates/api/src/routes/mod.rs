pub mod email;
pub mod health;
pub mod pipeline;
pub mod venues;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /pipeline                         list board records, add venue (GET, POST)
/// /pipeline/history                 archived + declined records (GET)
/// /pipeline/stream                  live board updates via SSE (GET)
/// /pipeline/bulk-status             bulk status change (POST)
/// /pipeline/{id}                    patch status/priority/notes, delete (PATCH, DELETE)
/// /pipeline/{id}/actions            contextual actions for the record (GET)
/// /pipeline/{id}/send-email         send the outreach email (POST)
/// /pipeline/{id}/restore            restore from history (POST)
///
/// /venues/search                    search the venue catalogue (GET)
///
/// /email/limits                     today's send allowance (GET)
///
/// /webhooks/email                   provider open events (POST, secret-gated)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Pipeline board and record operations.
        .nest("/pipeline", pipeline::router())
        // Venue catalogue search.
        .nest("/venues", venues::router())
        // Email quota visibility.
        .nest("/email", email::router())
        // Inbound provider webhooks (no user session).
        .nest("/webhooks", webhooks::router())
}
