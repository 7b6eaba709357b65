//! Email campaign entity: one row per outreach send.

use gigseeker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Campaign delivered to the provider.
pub const CAMPAIGN_SENT: &str = "sent";
/// Recipient opened the email (reported by the open webhook).
pub const CAMPAIGN_OPENED: &str = "opened";

/// A row from the `email_campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailCampaign {
    pub id: DbId,
    pub user_id: DbId,
    pub pipeline_venue_id: DbId,
    pub venue_id: DbId,
    pub subject: String,
    pub body_text: String,
    pub recipient_email: String,
    /// Message id assigned by the delivery provider; unique per send.
    pub provider_email_id: String,
    pub status: String,
    pub opened_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for recording a successful send.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmailCampaign {
    pub user_id: DbId,
    pub pipeline_venue_id: DbId,
    pub venue_id: DbId,
    pub subject: String,
    pub body_text: String,
    pub recipient_email: String,
    pub provider_email_id: String,
}
