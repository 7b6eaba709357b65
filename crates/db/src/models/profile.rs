//! User profile entity: display identity plus send-quota counters.

use chrono::NaiveDate;
use gigseeker_core::quota::SubscriptionTier;
use gigseeker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub booking_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
    /// Sends recorded on `last_email_date`; stale once the date rolls over.
    pub daily_email_count: i32,
    pub last_email_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub booking_email: Option<String>,
    pub subscription_tier: Option<SubscriptionTier>,
}
