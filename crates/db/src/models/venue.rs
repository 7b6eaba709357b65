//! Venue catalogue entity and search DTO.

use gigseeker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `venues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Venue {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a venue (catalogue seeding and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVenue {
    pub name: String,
    pub email: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

/// Default page size for catalogue searches.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Search filters for the venue catalogue. All filters are optional
/// and combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueSearch {
    /// Free-text match against name, city, and description.
    pub query: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Matches venues whose genre list overlaps any of these.
    pub genres: Option<Vec<String>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl VenueSearch {
    /// Effective page size, clamped to 1..=100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, 100)
    }

    /// Effective offset, never negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
