//! Repository for the `email_campaigns` table.

use chrono::NaiveDate;
use gigseeker_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::email_campaign::{CreateEmailCampaign, EmailCampaign};
use crate::models::pipeline_venue::PipelineVenue;
use crate::models::profile::Profile;
use crate::repositories::{PipelineVenueRepo, ProfileRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, pipeline_venue_id, venue_id, subject, body_text, \
    recipient_email, provider_email_id, status, opened_at, created_at";

/// All rows written by [`EmailCampaignRepo::record_send`].
#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub campaign: EmailCampaign,
    pub record: PipelineVenue,
    pub profile: Profile,
}

/// Provides CRUD operations for email campaigns.
pub struct EmailCampaignRepo;

impl EmailCampaignRepo {
    /// Record a successful send, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEmailCampaign,
    ) -> Result<EmailCampaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_campaigns
                (user_id, pipeline_venue_id, venue_id, subject, body_text,
                 recipient_email, provider_email_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(input.user_id)
            .bind(input.pipeline_venue_id)
            .bind(input.venue_id)
            .bind(&input.subject)
            .bind(&input.body_text)
            .bind(&input.recipient_email)
            .bind(&input.provider_email_id)
            .fetch_one(pool)
            .await
    }

    /// Persist every side effect of a delivered outreach email in one
    /// transaction: the campaign row, the record moving to `contacted`
    /// with its attempt counter bumped, and the daily send counter.
    /// Either all three land or none do.
    ///
    /// Returns `None` (and writes nothing) when the daily counter is
    /// already at `daily_limit` for `today`; a record deleted since the
    /// caller fetched it surfaces as `RowNotFound`.
    pub async fn record_send(
        pool: &PgPool,
        input: &CreateEmailCampaign,
        today: NaiveDate,
        daily_limit: i32,
    ) -> Result<Option<RecordedSend>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Guarded counter bump first: if a concurrent send took the
        // last slot, roll back before writing anything else.
        let counter = ProfileRepo::record_email_send_sql();
        let Some(profile) = sqlx::query_as::<_, Profile>(&counter)
            .bind(input.user_id)
            .bind(today)
            .bind(daily_limit)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO email_campaigns
                (user_id, pipeline_venue_id, venue_id, subject, body_text,
                 recipient_email, provider_email_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, EmailCampaign>(&insert)
            .bind(input.user_id)
            .bind(input.pipeline_venue_id)
            .bind(input.venue_id)
            .bind(&input.subject)
            .bind(&input.body_text)
            .bind(&input.recipient_email)
            .bind(&input.provider_email_id)
            .fetch_one(&mut *tx)
            .await?;

        let contacted = PipelineVenueRepo::mark_contacted_sql();
        let record = sqlx::query_as::<_, PipelineVenue>(&contacted)
            .bind(input.pipeline_venue_id)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(RecordedSend { campaign, record, profile }))
    }

    /// Resolve a campaign by the delivery provider's message id (the
    /// only key the open webhook carries).
    pub async fn find_by_provider_email_id(
        pool: &PgPool,
        provider_email_id: &str,
    ) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_campaigns WHERE provider_email_id = $1"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(provider_email_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a campaign opened at the given time. Idempotent: a campaign
    /// already marked opened keeps its original `opened_at`.
    pub async fn mark_opened(
        pool: &PgPool,
        id: DbId,
        occurred_at: Timestamp,
    ) -> Result<Option<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "UPDATE email_campaigns SET status = 'opened', opened_at = $2
             WHERE id = $1 AND status = 'sent'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(id)
            .bind(occurred_at)
            .fetch_optional(pool)
            .await
    }

    /// List a user's campaigns, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EmailCampaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_campaigns
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, EmailCampaign>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
