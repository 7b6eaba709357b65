//! Domain logic for the venue-outreach pipeline.
//!
//! Everything in this crate is pure (no I/O): the pipeline status model
//! and its transition table, the contextual action dispatcher, the
//! kanban board view-model with optimistic updates, bulk-operation
//! aggregation, and subscription-tier send quotas. The `db` and `api`
//! crates build on these types.

pub mod actions;
pub mod board;
pub mod bulk;
pub mod error;
pub mod quota;
pub mod status;
pub mod types;
