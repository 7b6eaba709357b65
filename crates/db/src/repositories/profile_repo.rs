//! Repository for the `profiles` table.

use chrono::NaiveDate;
use gigseeker_core::quota::SubscriptionTier;
use gigseeker_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, display_name, booking_email, subscription_tier, \
    daily_email_count, last_email_date, created_at, updated_at";

/// Provides CRUD operations for user profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a profile, returning the created row.
    ///
    /// Tier defaults to `free` if omitted.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, display_name, booking_email, subscription_tier)
             VALUES ($1, $2, $3, COALESCE($4, 'free'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.user_id)
            .bind(&input.display_name)
            .bind(&input.booking_email)
            .bind(input.subscription_tier)
            .fetch_one(pool)
            .await
    }

    /// Find a profile by its owning user id.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's subscription tier (driven by the billing
    /// provider's webhooks, outside this core).
    pub async fn update_tier(
        pool: &PgPool,
        user_id: DbId,
        tier: SubscriptionTier,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET subscription_tier = $2
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(tier)
            .fetch_optional(pool)
            .await
    }

    /// Count one email send against `today`, refusing to pass the
    /// daily ceiling.
    ///
    /// The counter restarts at 1 when the stored date is older than
    /// `today`, so stale usage never carries over. The WHERE guard
    /// makes the check-and-bump atomic: two concurrent sends racing
    /// the same last slot serialize on the row, and the loser gets
    /// `None` instead of exceeding the ceiling.
    pub async fn record_email_send(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
        daily_limit: i32,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = Self::record_email_send_sql();
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(today)
            .bind(daily_limit)
            .fetch_optional(pool)
            .await
    }

    /// The guarded counter-bump statement, shared with the
    /// transactional send path in the campaign repository.
    pub(crate) fn record_email_send_sql() -> String {
        format!(
            "UPDATE profiles SET
                daily_email_count = CASE
                    WHEN last_email_date = $2 THEN daily_email_count + 1
                    ELSE 1
                END,
                last_email_date = $2
             WHERE user_id = $1
               AND (last_email_date IS DISTINCT FROM $2 OR daily_email_count < $3)
             RETURNING {COLUMNS}"
        )
    }
}
