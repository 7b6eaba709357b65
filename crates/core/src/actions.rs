//! Outreach action dispatcher.
//!
//! For a record's current status, [`available_actions`] computes which
//! contextual actions the UI may offer, and [`dispatch`] resolves an
//! action into its effect (a status transition, an email send, or a
//! permanent delete). Both are exhaustive matches over
//! [`PipelineStatus`], so adding a status forces every table here to be
//! revisited.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::PipelineStatus;

/// A user action available on a pipeline record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachAction {
    /// Vet a discovered venue: `discovered` → `approved`.
    Approve,
    /// Send the outreach email (side effect owned by the api layer).
    SendEmail,
    /// Record a reply: `opened` → `responded`.
    MarkResponded,
    /// Pause outreach: any working status → `archived`.
    Archive,
    /// Reject the venue: any working status → `declined`.
    Decline,
    /// Bring a history record back: `archived`/`declined` → `discovered`.
    Restore,
    /// Permanently remove the record. Requires confirmation.
    Delete,
}

/// The effect of a successfully dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    /// Move the record to a new status.
    Transition(PipelineStatus),
    /// Send the outreach email; on success the record becomes
    /// `contacted` with `contact_attempts` incremented.
    SendEmail,
    /// Permanently delete the record.
    Delete,
}

/// Compute the contextual actions for a record's current status.
///
/// Delete is always available (with confirmation), so it is listed
/// last for every status.
pub fn available_actions(status: PipelineStatus) -> Vec<OutreachAction> {
    use OutreachAction::*;
    use PipelineStatus::*;
    match status {
        Discovered => vec![Approve, Archive, Decline, Delete],
        Approved => vec![SendEmail, Archive, Decline, Delete],
        Contacted => vec![Archive, Decline, Delete],
        Opened => vec![MarkResponded, Archive, Decline, Delete],
        Responded => vec![Archive, Decline, Delete],
        Booked => vec![Archive, Decline, Delete],
        Archived | Declined => vec![Restore, Delete],
    }
}

/// Resolve an action against the record's current status.
///
/// Fails with [`CoreError::Validation`] when the action is not legal
/// for the current status, and when a delete has not been confirmed --
/// an unconfirmed delete must never issue a request.
pub fn dispatch(
    action: OutreachAction,
    current: PipelineStatus,
    delete_confirmed: bool,
) -> Result<ActionEffect, CoreError> {
    use OutreachAction::*;
    use PipelineStatus::*;

    let illegal = |action: &str| {
        Err(CoreError::Validation(format!(
            "Action '{action}' is not available for status '{current}'"
        )))
    };

    match action {
        Approve => match current {
            Discovered => Ok(ActionEffect::Transition(Approved)),
            _ => illegal("approve"),
        },
        SendEmail => match current {
            Approved => Ok(ActionEffect::SendEmail),
            _ => illegal("send_email"),
        },
        MarkResponded => match current {
            Opened => Ok(ActionEffect::Transition(Responded)),
            _ => illegal("mark_responded"),
        },
        Archive => {
            if current.is_history() {
                illegal("archive")
            } else {
                Ok(ActionEffect::Transition(Archived))
            }
        }
        Decline => {
            if current.is_history() {
                illegal("decline")
            } else {
                Ok(ActionEffect::Transition(Declined))
            }
        }
        Restore => {
            if current.is_history() {
                Ok(ActionEffect::Transition(Discovered))
            } else {
                illegal("restore")
            }
        }
        Delete => {
            if delete_confirmed {
                Ok(ActionEffect::Delete)
            } else {
                Err(CoreError::Validation(
                    "Delete is permanent and must be explicitly confirmed".to_string(),
                ))
            }
        }
    }
}
