//! HTTP-level integration tests for the outreach email send and the
//! quota endpoints: tier gating, daily ceilings, delivery failures, and
//! the status side effects of a successful send.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    assert_error, body_json, build_test_app, get, post_json, seed_profile, seed_record,
    seed_venue, set_status, token_for,
};
use gigseeker_core::quota::SubscriptionTier;
use gigseeker_core::status::PipelineStatus;
use gigseeker_db::repositories::{EmailCampaignRepo, ProfileRepo};
use sqlx::PgPool;
use uuid::Uuid;

fn send_body() -> serde_json::Value {
    serde_json::json!({
        "subject": "Booking inquiry: The Midnight Ramblers",
        "body_text": "Hi! We'd love to play your room this fall.",
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn send_email_marks_contacted_and_counts_the_send(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Pro).await;
    let venue = seed_venue(&pool, "The Camel").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;

    let app = build_test_app(pool.clone());
    let mut events = app.event_bus.subscribe();
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        send_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["record"]["status"], "contacted");
    assert_eq!(json["record"]["contact_attempts"], 1);
    assert_eq!(json["remaining_today"], 9);
    assert_eq!(json["campaign"]["recipient_email"], venue.email);

    // The mailer saw exactly one message, addressed to the venue.
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, venue.email);

    // The campaign row exists and the daily counter advanced.
    let campaigns = EmailCampaignRepo::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].status, "sent");
    let profile = ProfileRepo::find_by_user_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(profile.daily_email_count, 1);

    let event = events.try_recv().expect("status event");
    assert_eq!(event.from_status, Some(PipelineStatus::Approved));
    assert_eq!(event.to_status, Some(PipelineStatus::Contacted));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn free_tier_cannot_send(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Free).await;
    let venue = seed_venue(&pool, "Broadberry").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;

    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        send_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TIER_RESTRICTED");
    assert_eq!(json["detail"]["required_tier"], "pro");
    assert!(app.mailer.sent().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn exhausted_quota_fails_closed(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Pro).await;
    let today = Utc::now().date_naive();
    for _ in 0..10 {
        ProfileRepo::record_email_send(&pool, user_id, today, 10).await.unwrap();
    }
    let venue = seed_venue(&pool, "Canal Club").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;

    let app = build_test_app(pool.clone());
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        send_body(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert_eq!(json["detail"]["limit"], 10);

    // Nothing was sent and the record did not move.
    assert!(app.mailer.sent().is_empty());
    let campaigns = EmailCampaignRepo::list_for_user(&pool, user_id).await.unwrap();
    assert!(campaigns.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn send_refused_unless_record_is_approved(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Pro).await;
    let venue = seed_venue(&pool, "Tin Pan").await;
    let record = seed_record(&pool, user_id, venue.id).await;

    let app = build_test_app(pool);
    let token = token_for(user_id);

    // Still discovered.
    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        send_body(),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    assert!(app.mailer.sent().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delivery_failure_leaves_the_record_untouched(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Agency).await;
    let venue = seed_venue(&pool, "The National").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;

    let app = build_test_app(pool.clone());
    app.mailer.fail_next();
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        send_body(),
    )
    .await;
    assert_error(response, StatusCode::BAD_GATEWAY, "EMAIL_DELIVERY_FAILED").await;

    // No campaign, no counter bump, status still approved.
    let campaigns = EmailCampaignRepo::list_for_user(&pool, user_id).await.unwrap();
    assert!(campaigns.is_empty());
    let profile = ProfileRepo::find_by_user_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(profile.daily_email_count, 0);

    let board = body_json(get(&app.router, "/api/v1/pipeline", &token).await).await;
    assert_eq!(board[0]["status"], "approved");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_subject_or_body_is_rejected(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Pro).await;
    let venue = seed_venue(&pool, "Friday Cheers").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;

    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/send-email", record.id),
        &token,
        serde_json::json!({ "subject": "  ", "body_text": "hello" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn limits_reports_the_daily_allowance(pool: PgPool) {
    let user_id = Uuid::new_v4();
    seed_profile(&pool, user_id, SubscriptionTier::Pro).await;
    let today = Utc::now().date_naive();
    for _ in 0..4 {
        ProfileRepo::record_email_send(&pool, user_id, today, 10).await.unwrap();
    }

    let app = build_test_app(pool);
    let token = token_for(user_id);

    let json = body_json(get(&app.router, "/api/v1/email/limits", &token).await).await;
    assert_eq!(json["tier"], "pro");
    assert_eq!(json["can_send"], true);
    assert_eq!(json["limit"], 10);
    assert_eq!(json["used_today"], 4);
    assert_eq!(json["remaining"], 6);
}
