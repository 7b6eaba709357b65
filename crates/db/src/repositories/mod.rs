//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every query that
//! touches user-owned data is scoped by `user_id`; a non-owned id is
//! indistinguishable from a missing one.

pub mod email_campaign_repo;
pub mod pipeline_venue_repo;
pub mod profile_repo;
pub mod venue_repo;

pub use email_campaign_repo::{EmailCampaignRepo, RecordedSend};
pub use pipeline_venue_repo::PipelineVenueRepo;
pub use profile_repo::ProfileRepo;
pub use venue_repo::VenueRepo;
