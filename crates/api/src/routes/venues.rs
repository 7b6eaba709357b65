//! Route definitions for the `/venues` catalogue.

use axum::routing::get;
use axum::Router;

use crate::handlers::venues;
use crate::state::AppState;

/// Routes mounted at `/venues`.
///
/// ```text
/// GET /search -> search  (?query, city, state, genres, limit, offset)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(venues::search))
}
