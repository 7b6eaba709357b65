//! Handlers for the `/venues` catalogue.

use axum::extract::{Query, State};
use axum::Json;
use gigseeker_db::models::venue::VenueSearch;
use gigseeker_db::repositories::VenueRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Query parameters for the catalogue search.
///
/// Genres arrive as a comma-separated list (`genres=indie,rock`) since
/// query strings cannot carry a native array.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub genres: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchQuery {
    fn into_filters(self) -> VenueSearch {
        let genres = self.genres.map(|g| {
            g.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });
        VenueSearch {
            query: self.query,
            city: self.city,
            state: self.state,
            genres: genres.filter(|g| !g.is_empty()),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// GET /api/v1/venues/search
///
/// Search the shared venue catalogue. All filters are optional and
/// combine with AND; results are paginated.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let filters = params.into_filters();
    let (venues, total) = VenueRepo::search(&state.pool, &filters).await?;

    Ok(Json(serde_json::json!({
        "venues": venues,
        "total": total,
        "limit": filters.limit(),
        "offset": filters.offset(),
    })))
}
