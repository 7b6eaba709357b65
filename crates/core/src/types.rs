//! Shared primitive type aliases.

/// Database identifier for all entities (UUID v4, generated by Postgres).
pub type DbId = uuid::Uuid;

/// UTC timestamp as stored in `timestamptz` columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Lowest priority level for a pipeline record.
pub const PRIORITY_LOW: i32 = 1;
/// Default priority level for a pipeline record.
pub const PRIORITY_MEDIUM: i32 = 2;
/// Highest priority level for a pipeline record.
pub const PRIORITY_HIGH: i32 = 3;

/// Validate that a priority value is one of the three accepted levels.
pub fn validate_priority(priority: i32) -> Result<(), crate::error::CoreError> {
    if (PRIORITY_LOW..=PRIORITY_HIGH).contains(&priority) {
        Ok(())
    } else {
        Err(crate::error::CoreError::Validation(format!(
            "Invalid priority {priority}. Must be between {PRIORITY_LOW} (low) and {PRIORITY_HIGH} (high)"
        )))
    }
}
