use crate::quota::SubscriptionTier;
use crate::types::DbId;

/// Domain-level error type shared by all crates.
///
/// The api crate maps each variant to an HTTP status and a stable error
/// code; nothing here is ever fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Email sending is not available on the caller's subscription tier.
    #[error("Email sending requires the {required} tier or higher")]
    TierRestricted { required: SubscriptionTier },

    /// The caller has exhausted today's email send quota.
    #[error("Daily email limit reached ({limit} per day, {remaining} remaining)")]
    QuotaExceeded { remaining: u32, limit: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}
