//! Route definitions for inbound provider webhooks.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /email -> email_event  (provider open events, secret-gated)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/email", post(webhooks::email_event))
}
