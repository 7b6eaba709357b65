//! Handlers for the `/pipeline` resource.
//!
//! The board listing, record mutations, bulk status changes, the
//! outreach email send, and the SSE stream that keeps open boards in
//! sync. Every operation is scoped to the authenticated user, and
//! status changes are validated against the transition table before any
//! row is touched.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::Utc;
use futures::future::join_all;
use gigseeker_core::actions::{available_actions, dispatch, ActionEffect, OutreachAction};
use gigseeker_core::bulk::{validate_bulk_request, BulkReport};
use gigseeker_core::error::CoreError;
use gigseeker_core::quota::check_send_allowed;
use gigseeker_core::status::{validate_transition, PipelineStatus};
use gigseeker_core::types::{validate_priority, DbId};
use gigseeker_db::models::email_campaign::CreateEmailCampaign;
use gigseeker_db::models::pipeline_venue::{
    CreatePipelineVenue, PipelineVenue, PipelineVenueWithVenue, UpdatePipelineVenue,
};
use gigseeker_db::repositories::{
    EmailCampaignRepo, PipelineVenueRepo, ProfileRepo, VenueRepo,
};
use gigseeker_events::PipelineEvent;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::{AppError, AppResult};
use crate::mailer::OutboundEmail;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/pipeline
///
/// List the user's active board records with venue details.
pub async fn list_board(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<PipelineVenueWithVenue>>> {
    let records = PipelineVenueRepo::list_active_for_user(&state.pool, user.user_id).await?;
    Ok(Json(records))
}

/// GET /api/v1/pipeline/history
///
/// List the user's archived and declined records.
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<PipelineVenueWithVenue>>> {
    let records = PipelineVenueRepo::list_history_for_user(&state.pool, user.user_id).await?;
    Ok(Json(records))
}

/// POST /api/v1/pipeline
///
/// Add a catalogue venue to the user's pipeline. New records start as
/// `discovered`. Returns 409 if the venue is already tracked.
pub async fn add_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreatePipelineVenue>,
) -> AppResult<(StatusCode, Json<PipelineVenue>)> {
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }

    VenueRepo::find_by_id(&state.pool, input.venue_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Venue",
            id: input.venue_id,
        })?;

    if PipelineVenueRepo::exists_for_user(&state.pool, user.user_id, input.venue_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Venue is already in your pipeline".to_string(),
        )));
    }

    // The uq_ constraint still backstops a concurrent double-add; the
    // race surfaces as the same 409 via error classification.
    let record = PipelineVenueRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /api/v1/pipeline/{id}
///
/// Partially update a record. A requested status change is checked
/// against the transition table for the record's current status, so a
/// stale client cannot force an illegal move. An explicit `"notes":
/// null` clears the notes; an absent field leaves them alone.
pub async fn update_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePipelineVenue>,
) -> AppResult<Json<PipelineVenue>> {
    let current = PipelineVenueRepo::find_by_id_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }
    if let Some(target) = input.status {
        validate_transition(current.status, target)?;
    }

    let updated = PipelineVenueRepo::update_for_user(&state.pool, id, user.user_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    if updated.status != current.status {
        state.event_bus.publish(PipelineEvent::status_changed(
            user.user_id,
            id,
            current.status,
            updated.status,
        ));
    }

    Ok(Json(updated))
}

/// Body for POST /api/v1/pipeline/bulk-status.
#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<DbId>,
    pub status: PipelineStatus,
}

/// POST /api/v1/pipeline/bulk-status
///
/// Move a selection of records toward one target status. Each record is
/// validated and updated independently; one refusal never aborts the
/// rest of the batch. The response reports per-id failures.
pub async fn bulk_status(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<BulkStatusRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validate_bulk_request(&input.ids)?;

    let updates = input.ids.iter().map(|&id| {
        let pool = state.pool.clone();
        let target = input.status;
        let user_id = user.user_id;
        async move {
            let outcome = apply_status_change(&pool, id, user_id, target).await;
            (id, outcome)
        }
    });
    let outcomes: Vec<(DbId, Result<PipelineStatus, String>)> = join_all(updates).await;

    for (id, outcome) in &outcomes {
        // Same-status no-ops succeed without publishing anything.
        if let Ok(from) = outcome {
            if *from != input.status {
                state.event_bus.publish(PipelineEvent::status_changed(
                    user.user_id,
                    *id,
                    *from,
                    input.status,
                ));
            }
        }
    }

    let report = BulkReport::from_outcomes(
        input.status,
        outcomes.into_iter().map(|(id, r)| (id, r.map(|_| ()))),
    );
    let message = report.summary();
    tracing::info!(
        user_id = %user.user_id,
        target = %input.status,
        requested = report.requested,
        succeeded = report.succeeded,
        "Bulk status change"
    );
    Ok(Json(serde_json::json!({
        "report": report,
        "message": message,
    })))
}

/// Validate and apply one status change for the bulk endpoint.
/// Returns the record's previous status on success.
async fn apply_status_change(
    pool: &gigseeker_db::DbPool,
    id: DbId,
    user_id: DbId,
    target: PipelineStatus,
) -> Result<PipelineStatus, String> {
    let current = PipelineVenueRepo::find_by_id_for_user(pool, id, user_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("PipelineVenue with id {id} not found"))?;

    if current.status == target {
        return Ok(current.status);
    }
    validate_transition(current.status, target).map_err(|e| e.to_string())?;

    PipelineVenueRepo::update_status_for_user(pool, id, user_id, target)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("PipelineVenue with id {id} not found"))?;
    Ok(current.status)
}

/// GET /api/v1/pipeline/{id}/actions
///
/// The contextual actions available for the record's current status.
pub async fn record_actions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let record = PipelineVenueRepo::find_by_id_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    Ok(Json(serde_json::json!({
        "status": record.status,
        "actions": available_actions(record.status),
    })))
}

/// Body for POST /api/v1/pipeline/{id}/send-email.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub subject: String,
    pub body_text: String,
}

/// POST /api/v1/pipeline/{id}/send-email
///
/// Send the outreach email for an approved record. The tier gate and
/// daily quota are checked before any network send; on success the
/// record becomes `contacted`, the send is counted against today, and a
/// campaign row is created for open tracking.
pub async fn send_email(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SendEmailRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if input.subject.trim().is_empty() {
        return Err(CoreError::Validation("Email subject must not be empty".to_string()).into());
    }
    if input.body_text.trim().is_empty() {
        return Err(CoreError::Validation("Email body must not be empty".to_string()).into());
    }

    let record = PipelineVenueRepo::find_by_id_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    // Only approved records may be emailed.
    match dispatch(OutreachAction::SendEmail, record.status, false)? {
        ActionEffect::SendEmail => {}
        _ => unreachable!("send_email dispatches to SendEmail"),
    }

    let venue = VenueRepo::find_by_id(&state.pool, record.venue_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Venue",
            id: record.venue_id,
        })?;
    let profile = ProfileRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Profile",
            id: user.user_id,
        })?;

    let today = Utc::now().date_naive();
    let allowance = check_send_allowed(
        profile.subscription_tier,
        profile.daily_email_count.max(0) as u32,
        profile.last_email_date,
        today,
    )?;

    let sent = state
        .mailer
        .send(&OutboundEmail {
            to: venue.email.clone(),
            subject: input.subject.clone(),
            body_text: input.body_text.clone(),
        })
        .await
        .map_err(|e| AppError::EmailDelivery(e.to_string()))?;

    // One transaction for every row the send touches: the campaign,
    // the record moving to `contacted`, and the daily counter. A
    // concurrent send that takes the last slot first comes back as
    // `None` here, after the pre-check already passed.
    let recorded = EmailCampaignRepo::record_send(
        &state.pool,
        &CreateEmailCampaign {
            user_id: user.user_id,
            pipeline_venue_id: record.id,
            venue_id: venue.id,
            subject: input.subject,
            body_text: input.body_text,
            recipient_email: venue.email,
            provider_email_id: sent.provider_email_id,
        },
        today,
        allowance.limit as i32,
    )
    .await?
    .ok_or(CoreError::QuotaExceeded {
        remaining: 0,
        limit: allowance.limit,
    })?;

    state.event_bus.publish(PipelineEvent::status_changed(
        user.user_id,
        id,
        record.status,
        recorded.record.status,
    ));
    tracing::info!(
        user_id = %user.user_id,
        pipeline_venue_id = %id,
        campaign_id = %recorded.campaign.id,
        "Outreach email sent"
    );

    let remaining_today = allowance
        .limit
        .saturating_sub(recorded.profile.daily_email_count.max(0) as u32);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "campaign": recorded.campaign,
            "record": recorded.record,
            "remaining_today": remaining_today,
        })),
    ))
}

/// POST /api/v1/pipeline/{id}/restore
///
/// Bring an archived or declined record back onto the board as
/// `discovered`. Priority, notes, and contact history are preserved.
pub async fn restore(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<PipelineVenue>> {
    let record = PipelineVenueRepo::find_by_id_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    dispatch(OutreachAction::Restore, record.status, false)?;

    let restored = PipelineVenueRepo::restore_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    state.event_bus.publish(PipelineEvent::status_changed(
        user.user_id,
        id,
        record.status,
        restored.status,
    ));

    Ok(Json(restored))
}

/// Query parameters for DELETE /api/v1/pipeline/{id}.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Permanent deletes must be explicitly confirmed.
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /api/v1/pipeline/{id}?confirm=true
///
/// Permanently remove a record. Refused with 400 unless `confirm=true`.
pub async fn delete_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    let record = PipelineVenueRepo::find_by_id_for_user(&state.pool, id, user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        })?;

    dispatch(OutreachAction::Delete, record.status, params.confirm)?;

    let deleted = PipelineVenueRepo::delete_for_user(&state.pool, id, user.user_id).await?;
    if deleted {
        tracing::info!(user_id = %user.user_id, pipeline_venue_id = %id, "Pipeline record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PipelineVenue",
            id,
        }))
    }
}

/// GET /api/v1/pipeline/stream
///
/// Server-sent events carrying the caller's pipeline events, so an open
/// board reflects webhook-driven changes without polling.
pub async fn stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.event_bus.subscribe();
    let user_id = user.user_id;

    let stream = BroadcastStream::new(receiver).filter_map(move |result| {
        // Lagged receivers drop missed events; the client reconciles on
        // its next full fetch.
        let event = result.ok()?;
        if event.user_id != user_id {
            return None;
        }
        let sse_event = Event::default()
            .event(event.event_type.clone())
            .json_data(&event)
            .ok()?;
        Some(Ok(sse_event))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
