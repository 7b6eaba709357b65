//! Handlers for inbound email-provider webhooks.
//!
//! The provider reports delivery lifecycle events keyed by the message
//! id it assigned at send time. Open events advance `contacted` records
//! to `opened`; everything else is acknowledged and ignored. Processing
//! is idempotent, so provider retries are harmless.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use gigseeker_core::error::CoreError;
use gigseeker_core::types::Timestamp;
use gigseeker_db::repositories::{EmailCampaignRepo, PipelineVenueRepo};
use gigseeker_events::PipelineEvent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Payload of a provider delivery event.
#[derive(Debug, Deserialize)]
pub struct EmailWebhookPayload {
    /// Provider event name, e.g. `"email.opened"`.
    pub event_type: String,
    /// The message id the provider assigned at send time.
    pub provider_email_id: String,
    /// When the event occurred; defaults to receipt time.
    pub occurred_at: Option<Timestamp>,
}

/// POST /api/v1/webhooks/email
///
/// Ingest a provider delivery event. Requests must carry the shared
/// secret in `x-webhook-secret` when one is configured.
pub async fn email_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EmailWebhookPayload>,
) -> AppResult<Json<serde_json::Value>> {
    verify_secret(&state, &headers)?;

    if payload.event_type != "email.opened" {
        tracing::debug!(event_type = %payload.event_type, "Ignoring unhandled webhook event");
        return Ok(Json(serde_json::json!({ "handled": false })));
    }

    // Unknown message ids are acknowledged so the provider stops
    // retrying; sends can predate open tracking.
    let Some(campaign) =
        EmailCampaignRepo::find_by_provider_email_id(&state.pool, &payload.provider_email_id)
            .await?
    else {
        tracing::warn!(
            provider_email_id = %payload.provider_email_id,
            "Open event for unknown campaign"
        );
        return Ok(Json(serde_json::json!({ "handled": false })));
    };

    let occurred_at = payload.occurred_at.unwrap_or_else(Utc::now);
    let newly_opened = EmailCampaignRepo::mark_opened(&state.pool, campaign.id, occurred_at)
        .await?
        .is_some();

    // Advance the pipeline record only if it is still `contacted`; a
    // record the user has already moved on is left untouched.
    let advanced = PipelineVenueRepo::mark_opened(&state.pool, campaign.pipeline_venue_id)
        .await?
        .is_some();
    if advanced {
        state.event_bus.publish(PipelineEvent::email_opened(
            campaign.user_id,
            campaign.pipeline_venue_id,
        ));
    }

    tracing::info!(
        campaign_id = %campaign.id,
        newly_opened,
        advanced,
        "Processed email open event"
    );
    Ok(Json(serde_json::json!({
        "handled": true,
        "campaign_opened": newly_opened,
        "record_advanced": advanced,
    })))
}

/// Check the shared webhook secret when one is configured.
fn verify_secret(state: &AppState, headers: &HeaderMap) -> Result<(), CoreError> {
    let Some(expected) = &state.config.webhook_secret else {
        return Ok(());
    };
    let provided = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok());
    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Invalid or missing webhook secret".to_string(),
        ))
    }
}
