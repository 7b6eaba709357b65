//! Subscription tiers and email send quotas.
//!
//! Sending fails closed: the tier gate and the daily ceiling are both
//! checked before any network send, and a refusal never mutates the
//! record. The daily counter is date-scoped -- usage recorded on a
//! previous day does not count against today.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Subscription level gating send-email capability and rate ceilings.
///
/// Stored lowercase in the `profiles.subscription_tier` text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Agency,
}

impl SubscriptionTier {
    /// Whether this tier may send outreach emails at all.
    pub fn can_send_email(self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    /// Daily outreach email ceiling for this tier.
    pub fn daily_email_limit(self) -> u32 {
        match self {
            SubscriptionTier::Free => 0,
            SubscriptionTier::Pro => 10,
            SubscriptionTier::Agency => 50,
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Agency => "agency",
        })
    }
}

/// A granted send allowance, returned when the quota check passes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SendAllowance {
    /// Daily ceiling for the caller's tier.
    pub limit: u32,
    /// Sends already counted against today.
    pub used_today: u32,
    /// Sends left today, including the one just granted.
    pub remaining: u32,
}

/// Sends counted against `today`, given the stored counter and the date
/// it was last bumped. A counter from a previous day has reset.
pub fn used_today(
    daily_email_count: u32,
    last_email_date: Option<NaiveDate>,
    today: NaiveDate,
) -> u32 {
    match last_email_date {
        Some(date) if date == today => daily_email_count,
        _ => 0,
    }
}

/// Check whether one more email may be sent today.
///
/// Fails with [`CoreError::TierRestricted`] for tiers that cannot send
/// at all, and [`CoreError::QuotaExceeded`] once the daily ceiling is
/// reached; both carry the structured detail the UI needs to offer an
/// upgrade path instead of a bare error string.
pub fn check_send_allowed(
    tier: SubscriptionTier,
    daily_email_count: u32,
    last_email_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<SendAllowance, CoreError> {
    if !tier.can_send_email() {
        return Err(CoreError::TierRestricted { required: SubscriptionTier::Pro });
    }
    let limit = tier.daily_email_limit();
    let used = used_today(daily_email_count, last_email_date, today);
    if used >= limit {
        return Err(CoreError::QuotaExceeded { remaining: 0, limit });
    }
    Ok(SendAllowance { limit, used_today: used, remaining: limit - used })
}
