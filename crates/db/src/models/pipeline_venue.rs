//! Pipeline record entity and DTOs.

use gigseeker_core::status::PipelineStatus;
use gigseeker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pipeline_venues` table: one venue's position in one
/// user's outreach pipeline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineVenue {
    pub id: DbId,
    /// Owning user; immutable after creation and the scope of every query.
    pub user_id: DbId,
    pub venue_id: DbId,
    pub status: PipelineStatus,
    pub priority: i32,
    /// Incremented only by a successful email send; never decremented.
    pub contact_attempts: i32,
    pub last_contact_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A pipeline record joined with its venue's display fields, as
/// returned by the board and history listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PipelineVenueWithVenue {
    pub id: DbId,
    pub user_id: DbId,
    pub venue_id: DbId,
    pub status: PipelineStatus,
    pub priority: i32,
    pub contact_attempts: i32,
    pub last_contact_at: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub venue_name: String,
    pub venue_email: String,
    pub venue_city: String,
    pub venue_state: String,
    pub venue_genres: Vec<String>,
}

/// DTO for adding a venue to the caller's pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePipelineVenue {
    pub venue_id: DbId,
    /// Defaults to 2 (medium) if omitted.
    pub priority: Option<i32>,
}

/// DTO for patching a pipeline record. All fields are optional; the
/// status transition is validated by the caller before the update runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePipelineVenue {
    pub status: Option<PipelineStatus>,
    pub priority: Option<i32>,
    /// `None` leaves notes alone; `Some(None)` clears them; an absent
    /// field and an explicit JSON `null` deserialize differently.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Deserialize a field so that an explicit `null` becomes `Some(None)`
/// while an absent field stays `None` (via `#[serde(default)]`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
