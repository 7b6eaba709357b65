//! In-process event infrastructure for the booking pipeline.
//!
//! - [`EventBus`] -- publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PipelineEvent`] -- the canonical event envelope for status changes
//!   and email opens, fanned out to SSE subscribers by the API layer.

pub mod bus;

pub use bus::{EventBus, PipelineEvent};
