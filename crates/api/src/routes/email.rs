//! Route definitions for the `/email` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::email;
use crate::state::AppState;

/// Routes mounted at `/email`.
///
/// ```text
/// GET /limits -> limits  (today's send allowance)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/limits", get(email::limits))
}
