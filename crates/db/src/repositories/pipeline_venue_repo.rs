//! Repository for the `pipeline_venues` table.

use gigseeker_core::status::PipelineStatus;
use gigseeker_core::types::DbId;
use sqlx::PgPool;

use crate::models::pipeline_venue::{
    CreatePipelineVenue, PipelineVenue, PipelineVenueWithVenue, UpdatePipelineVenue,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, venue_id, status, priority, contact_attempts, \
    last_contact_at, notes, created_at, updated_at";

/// Column list for listings joined with the venue catalogue.
const JOINED_COLUMNS: &str = "pv.id, pv.user_id, pv.venue_id, pv.status, pv.priority, \
    pv.contact_attempts, pv.last_contact_at, pv.notes, pv.created_at, pv.updated_at, \
    v.name AS venue_name, v.email AS venue_email, v.city AS venue_city, \
    v.state AS venue_state, v.genres AS venue_genres";

/// Provides owner-scoped CRUD operations for pipeline records.
pub struct PipelineVenueRepo;

impl PipelineVenueRepo {
    /// Insert a new pipeline record for the given user.
    ///
    /// New records always start as `discovered`; priority defaults to 2
    /// (medium). The `uq_pipeline_venues_user_venue` constraint rejects
    /// a duplicate (user, venue) pair.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreatePipelineVenue,
    ) -> Result<PipelineVenue, sqlx::Error> {
        let query = format!(
            "INSERT INTO pipeline_venues (user_id, venue_id, priority)
             VALUES ($1, $2, COALESCE($3, 2))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(user_id)
            .bind(input.venue_id)
            .bind(input.priority)
            .fetch_one(pool)
            .await
    }

    /// Whether the user already has this venue in their pipeline.
    pub async fn exists_for_user(
        pool: &PgPool,
        user_id: DbId,
        venue_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pipeline_venues WHERE user_id = $1 AND venue_id = $2)",
        )
        .bind(user_id)
        .bind(venue_id)
        .fetch_one(pool)
        .await
    }

    /// Find one record, scoped to its owner.
    pub async fn find_by_id_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pipeline_venues WHERE id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's active (non-history) records with venue details,
    /// newest first.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PipelineVenueWithVenue>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM pipeline_venues pv
             JOIN venues v ON v.id = pv.venue_id
             WHERE pv.user_id = $1 AND pv.status NOT IN ('archived', 'declined')
             ORDER BY pv.created_at DESC"
        );
        sqlx::query_as::<_, PipelineVenueWithVenue>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the user's archived and declined records with venue details,
    /// most recently updated first.
    pub async fn list_history_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PipelineVenueWithVenue>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM pipeline_venues pv
             JOIN venues v ON v.id = pv.venue_id
             WHERE pv.user_id = $1 AND pv.status IN ('archived', 'declined')
             ORDER BY pv.updated_at DESC"
        );
        sqlx::query_as::<_, PipelineVenueWithVenue>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Patch a record's status/priority/notes, scoped to its owner.
    /// Only provided fields are applied; an explicit `null` for notes
    /// clears them (see [`UpdatePipelineVenue::notes`]).
    ///
    /// Returns `None` if the record does not exist for this user.
    pub async fn update_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdatePipelineVenue,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = format!(
            "UPDATE pipeline_venues SET
                status = COALESCE($3, status),
                priority = COALESCE($4, priority),
                notes = CASE WHEN $6 THEN $5 ELSE notes END
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.notes.clone().flatten())
            .bind(input.notes.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Set a record's status, scoped to its owner.
    pub async fn update_status_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        status: PipelineStatus,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = format!(
            "UPDATE pipeline_venues SET status = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful email send: status → `contacted`, bump the
    /// attempt counter, stamp the contact time. Touches nothing else.
    pub async fn mark_contacted(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = Self::mark_contacted_sql();
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The mark-contacted statement, shared with the transactional send
    /// path in the campaign repository.
    pub(crate) fn mark_contacted_sql() -> String {
        format!(
            "UPDATE pipeline_venues SET
                status = 'contacted',
                contact_attempts = contact_attempts + 1,
                last_contact_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        )
    }

    /// Advance `contacted` → `opened` from the email-open webhook.
    ///
    /// Not owner-scoped (the webhook has no user session); the guard is
    /// the current-status predicate, so a record that has already moved
    /// on is left untouched.
    pub async fn mark_opened(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = format!(
            "UPDATE pipeline_venues SET status = 'opened'
             WHERE id = $1 AND status = 'contacted'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Restore an archived or declined record to `discovered`.
    ///
    /// Only the status changes; priority, notes, and the contact
    /// counters are preserved. Returns `None` when the record is not in
    /// a history status (or not owned by this user).
    pub async fn restore_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<PipelineVenue>, sqlx::Error> {
        let query = format!(
            "UPDATE pipeline_venues SET status = 'discovered'
             WHERE id = $1 AND user_id = $2 AND status IN ('archived', 'declined')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PipelineVenue>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a record, scoped to its owner. Returns `true`
    /// if a row was removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pipeline_venues WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
