//! Bulk operation aggregation.
//!
//! A bulk status change fans out one independent update per selected
//! record (the api layer runs them concurrently; each targets a
//! disjoint record so ordering does not matter). This module owns the
//! request validation and the partial-failure bookkeeping: one failed
//! update never aborts the rest, and the report counts exactly the
//! updates that succeeded.

use serde::Serialize;

use crate::error::CoreError;
use crate::status::PipelineStatus;
use crate::types::DbId;

/// A single failed update within a bulk batch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BulkFailure {
    pub id: DbId,
    pub reason: String,
}

/// Aggregate outcome of a bulk status change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BulkReport {
    /// The status every record in the batch was moved toward.
    pub target: PipelineStatus,
    /// Number of updates attempted (the size of the selection).
    pub requested: usize,
    /// Number of updates that succeeded.
    pub succeeded: usize,
    /// The updates that failed, with per-id reasons.
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    /// Collect per-id outcomes into a report.
    ///
    /// Every outcome is counted; `succeeded + failed.len() == requested`.
    pub fn from_outcomes(
        target: PipelineStatus,
        outcomes: impl IntoIterator<Item = (DbId, Result<(), String>)>,
    ) -> Self {
        let mut requested = 0;
        let mut succeeded = 0;
        let mut failed = Vec::new();
        for (id, result) in outcomes {
            requested += 1;
            match result {
                Ok(()) => succeeded += 1,
                Err(reason) => failed.push(BulkFailure { id, reason }),
            }
        }
        Self { target, requested, succeeded, failed }
    }

    /// User-facing summary line ("Updated 3 venues").
    pub fn summary(&self) -> String {
        let noun = if self.succeeded == 1 { "venue" } else { "venues" };
        if self.failed.is_empty() {
            format!("Updated {} {noun}", self.succeeded)
        } else {
            format!(
                "Updated {} {noun}, {} failed",
                self.succeeded,
                self.failed.len()
            )
        }
    }
}

/// Validate a bulk request before any update is issued.
///
/// The id set must be non-empty and free of duplicates (a duplicate id
/// would double-count one record in the report).
pub fn validate_bulk_request(ids: &[DbId]) -> Result<(), CoreError> {
    if ids.is_empty() {
        return Err(CoreError::Validation(
            "Bulk update requires at least one record id".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Duplicate record id in bulk update: {id}"
            )));
        }
    }
    Ok(())
}
