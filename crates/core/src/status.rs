//! Pipeline status model and transition table.
//!
//! A venue-outreach record moves through six working statuses in
//! pipeline order (`discovered` → ... → `booked`) plus two absorbing
//! history statuses (`archived`, `declined`) that can only be exited by
//! a restore back to `discovered`.
//!
//! The transition table here is authoritative: the update endpoint
//! validates every status change against it before mutating anything,
//! and the board controller consults the same table before issuing a
//! move request.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One venue's position in a user's outreach pipeline.
///
/// Stored lowercase in the `pipeline_venues.status` text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum PipelineStatus {
    /// Newly added, unvetted.
    Discovered,
    /// Vetted and ready to contact.
    Approved,
    /// Outreach email sent.
    Contacted,
    /// Recipient opened the email (driven by the open webhook).
    Opened,
    /// Recipient replied.
    Responded,
    /// Gig confirmed.
    Booked,
    /// Voluntarily paused; restorable.
    Archived,
    /// Rejected; restorable.
    Declined,
}

/// The six working statuses in pipeline order. One kanban column each.
pub const PIPELINE_ORDER: [PipelineStatus; 6] = [
    PipelineStatus::Discovered,
    PipelineStatus::Approved,
    PipelineStatus::Contacted,
    PipelineStatus::Opened,
    PipelineStatus::Responded,
    PipelineStatus::Booked,
];

/// The two absorbing history statuses.
pub const HISTORY_STATUSES: [PipelineStatus; 2] =
    [PipelineStatus::Archived, PipelineStatus::Declined];

impl PipelineStatus {
    /// Lowercase wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::Discovered => "discovered",
            PipelineStatus::Approved => "approved",
            PipelineStatus::Contacted => "contacted",
            PipelineStatus::Opened => "opened",
            PipelineStatus::Responded => "responded",
            PipelineStatus::Booked => "booked",
            PipelineStatus::Archived => "archived",
            PipelineStatus::Declined => "declined",
        }
    }

    /// Parse the lowercase storage representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "discovered" => Ok(PipelineStatus::Discovered),
            "approved" => Ok(PipelineStatus::Approved),
            "contacted" => Ok(PipelineStatus::Contacted),
            "opened" => Ok(PipelineStatus::Opened),
            "responded" => Ok(PipelineStatus::Responded),
            "booked" => Ok(PipelineStatus::Booked),
            "archived" => Ok(PipelineStatus::Archived),
            "declined" => Ok(PipelineStatus::Declined),
            other => Err(CoreError::Validation(format!(
                "Unknown pipeline status: '{other}'"
            ))),
        }
    }

    /// Whether this is one of the absorbing history statuses.
    pub fn is_history(self) -> bool {
        matches!(self, PipelineStatus::Archived | PipelineStatus::Declined)
    }

    /// The statuses this one may legally transition to.
    ///
    /// Every working status may be archived or declined; archived and
    /// declined may only be restored to `discovered`.
    pub fn legal_targets(self) -> &'static [PipelineStatus] {
        use PipelineStatus::*;
        match self {
            Discovered => &[Approved, Archived, Declined],
            Approved => &[Contacted, Archived, Declined],
            Contacted => &[Opened, Archived, Declined],
            Opened => &[Responded, Archived, Declined],
            Responded => &[Booked, Archived, Declined],
            Booked => &[Archived, Declined],
            Archived => &[Discovered],
            Declined => &[Discovered],
        }
    }

    /// Whether moving from `self` to `target` is a legal transition.
    ///
    /// A same-status "transition" is not legal; callers treat it as a
    /// no-op and never reach this check.
    pub fn can_transition(self, target: PipelineStatus) -> bool {
        self.legal_targets().contains(&target)
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a status transition, producing a descriptive error on refusal.
pub fn validate_transition(
    from: PipelineStatus,
    to: PipelineStatus,
) -> Result<(), CoreError> {
    if from == to {
        return Ok(());
    }
    if from.can_transition(to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Illegal status transition: {from} -> {to}. Legal targets: {}",
            from.legal_targets()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}
