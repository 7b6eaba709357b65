//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`PipelineEvent`]s. It
//! is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use gigseeker_core::status::PipelineStatus;
use gigseeker_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PipelineEvent
// ---------------------------------------------------------------------------

/// Event name for a pipeline record changing status.
pub const STATUS_CHANGED: &str = "status.changed";
/// Event name for a tracked outreach email being opened.
pub const EMAIL_OPENED: &str = "email.opened";

/// A domain event that occurred on a user's pipeline.
///
/// Every event names its owning user; subscribers that serve a single
/// session filter on `user_id` before forwarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Dot-separated event name, e.g. `"status.changed"`.
    pub event_type: String,

    /// Owner of the pipeline record the event concerns.
    pub user_id: DbId,

    /// The pipeline record the event concerns.
    pub pipeline_venue_id: DbId,

    /// Status before the change, when the event carries one.
    pub from_status: Option<PipelineStatus>,

    /// Status after the change, when the event carries one.
    pub to_status: Option<PipelineStatus>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    /// A pipeline record moved between statuses.
    pub fn status_changed(
        user_id: DbId,
        pipeline_venue_id: DbId,
        from: PipelineStatus,
        to: PipelineStatus,
    ) -> Self {
        Self {
            event_type: STATUS_CHANGED.to_string(),
            user_id,
            pipeline_venue_id,
            from_status: Some(from),
            to_status: Some(to),
            timestamp: Utc::now(),
        }
    }

    /// A tracked outreach email was opened by its recipient.
    pub fn email_opened(user_id: DbId, pipeline_venue_id: DbId) -> Self {
        Self {
            event_type: EMAIL_OPENED.to_string(),
            user_id,
            pipeline_venue_id,
            from_status: Some(PipelineStatus::Contacted),
            to_status: Some(PipelineStatus::Opened),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PipelineEvent`].
///
/// # Usage
///
/// ```rust
/// use gigseeker_events::bus::{EventBus, PipelineEvent};
/// use gigseeker_core::status::PipelineStatus;
/// # use uuid::Uuid;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PipelineEvent::status_changed(
///     Uuid::new_v4(),
///     Uuid::new_v4(),
///     PipelineStatus::Discovered,
///     PipelineStatus::Approved,
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: PipelineEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
