use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mailer::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gigseeker_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus feeding the board's live update stream.
    pub event_bus: Arc<gigseeker_events::EventBus>,
    /// Outreach email delivery (SMTP in production, mock in tests).
    pub mailer: Arc<dyn Mailer>,
}
