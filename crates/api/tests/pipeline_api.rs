//! HTTP-level integration tests for the `/pipeline` endpoints: board
//! listing, adding venues, status changes, bulk updates, restore, and
//! delete.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, delete, get, get_unauthed, patch_json, post_json,
    seed_record, seed_venue, set_status, token_for,
};
use gigseeker_core::status::PipelineStatus;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn pipeline_requires_a_bearer_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get_unauthed(&app.router, "/api/v1/pipeline").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// ---------------------------------------------------------------------------
// Adding venues
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn add_venue_creates_a_discovered_record(pool: PgPool) {
    let venue = seed_venue(&pool, "The Camel").await;
    let app = build_test_app(pool);
    let token = token_for(Uuid::new_v4());

    let response = post_json(
        &app.router,
        "/api/v1/pipeline",
        &token,
        serde_json::json!({ "venue_id": venue.id, "priority": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["status"], "discovered");
    assert_eq!(json["priority"], 3);

    let response = get(&app.router, "/api/v1/pipeline", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let board = body_json(response).await;
    let records = board.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["venue_name"], "The Camel");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn add_venue_twice_conflicts(pool: PgPool) {
    let venue = seed_venue(&pool, "Broadberry").await;
    let app = build_test_app(pool);
    let token = token_for(Uuid::new_v4());
    let body = serde_json::json!({ "venue_id": venue.id });

    let response = post_json(&app.router, "/api/v1/pipeline", &token, body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(&app.router, "/api/v1/pipeline", &token, body).await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn add_unknown_venue_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);
    let token = token_for(Uuid::new_v4());

    let response = post_json(
        &app.router,
        "/api/v1/pipeline",
        &token,
        serde_json::json!({ "venue_id": Uuid::new_v4() }),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Status changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn legal_transition_updates_and_publishes(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Canal Club").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool);
    let mut events = app.event_bus.subscribe();
    let token = token_for(user_id);

    let response = patch_json(
        &app.router,
        &format!("/api/v1/pipeline/{}", record.id),
        &token,
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "approved");

    let event = events.try_recv().expect("a status event should be published");
    assert_eq!(event.event_type, "status.changed");
    assert_eq!(event.pipeline_venue_id, record.id);
    assert_eq!(event.from_status, Some(PipelineStatus::Discovered));
    assert_eq!(event.to_status, Some(PipelineStatus::Approved));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn illegal_transition_is_refused_server_side(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Tin Pan").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool.clone());
    let token = token_for(user_id);

    // discovered -> booked skips the whole funnel.
    let response = patch_json(
        &app.router,
        &format!("/api/v1/pipeline/{}", record.id),
        &token,
        serde_json::json!({ "status": "booked" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    // The record is untouched.
    let response = get(&app.router, "/api/v1/pipeline", &token).await;
    let board = body_json(response).await;
    assert_eq!(board[0]["status"], "discovered");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_rejects_out_of_range_priority(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "The National").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = patch_json(
        &app.router,
        &format!("/api/v1/pipeline/{}", record.id),
        &token,
        serde_json::json!({ "priority": 9 }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_with_explicit_null_clears_notes(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Strange Matter").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool);
    let token = token_for(user_id);
    let url = format!("/api/v1/pipeline/{}", record.id);

    let response = patch_json(
        &app.router,
        &url,
        &token,
        serde_json::json!({ "notes": "all-ages room, books three months out" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A patch that omits the field leaves the notes in place.
    let response = patch_json(
        &app.router,
        &url,
        &token,
        serde_json::json!({ "priority": 1 }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["notes"], "all-ages room, books three months out");

    // An explicit null clears them.
    let response = patch_json(&app.router, &url, &token, serde_json::json!({ "notes": null }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["notes"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn records_are_invisible_to_other_users(pool: PgPool) {
    let owner = Uuid::new_v4();
    let venue = seed_venue(&pool, "Ashland Theatre").await;
    let record = seed_record(&pool, owner, venue.id).await;
    let app = build_test_app(pool);
    let stranger_token = token_for(Uuid::new_v4());

    let response = patch_json(
        &app.router,
        &format!("/api/v1/pipeline/{}", record.id),
        &stranger_token,
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = get(&app.router, "/api/v1/pipeline", &stranger_token).await;
    let board = body_json(response).await;
    assert!(board.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Contextual actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn actions_follow_the_record_status(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Friday Cheers").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool.clone());
    let token = token_for(user_id);
    let uri = format!("/api/v1/pipeline/{}/actions", record.id);

    let json = body_json(get(&app.router, &uri, &token).await).await;
    assert_eq!(json["status"], "discovered");
    let actions = json["actions"].as_array().unwrap();
    assert!(actions.contains(&serde_json::json!("approve")));
    assert!(!actions.contains(&serde_json::json!("send_email")));

    set_status(&pool, record.id, user_id, PipelineStatus::Approved).await;
    let json = body_json(get(&app.router, &uri, &token).await).await;
    assert!(json["actions"].as_array().unwrap().contains(&serde_json::json!("send_email")));
}

// ---------------------------------------------------------------------------
// Bulk status changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_status_reports_partial_failure(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let v1 = seed_venue(&pool, "Venue One").await;
    let v2 = seed_venue(&pool, "Venue Two").await;
    let r1 = seed_record(&pool, user_id, v1.id).await;
    let r2 = seed_record(&pool, user_id, v2.id).await;
    // r2 is already booked; approved is only reachable from discovered,
    // so the batch must split into one success and one refusal.
    set_status(&pool, r2.id, user_id, PipelineStatus::Booked).await;

    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        "/api/v1/pipeline/bulk-status",
        &token,
        serde_json::json!({ "ids": [r1.id, r2.id], "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["report"]["requested"], 2);
    assert_eq!(json["report"]["succeeded"], 1);
    let failed = json["report"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["id"], serde_json::json!(r2.id));
    assert_eq!(json["message"], "Updated 1 venue, 1 failed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_status_rejects_empty_and_duplicate_selections(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Black Cat").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = post_json(
        &app.router,
        "/api/v1/pipeline/bulk-status",
        &token,
        serde_json::json!({ "ids": [], "status": "archived" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = post_json(
        &app.router,
        "/api/v1/pipeline/bulk-status",
        &token,
        serde_json::json!({ "ids": [record.id, record.id], "status": "archived" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// History, restore, delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn archived_records_move_to_history_and_restore(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "Cat's Cradle").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    set_status(&pool, record.id, user_id, PipelineStatus::Archived).await;

    let app = build_test_app(pool);
    let token = token_for(user_id);

    let board = body_json(get(&app.router, "/api/v1/pipeline", &token).await).await;
    assert!(board.as_array().unwrap().is_empty());
    let history = body_json(get(&app.router, "/api/v1/pipeline/history", &token).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/restore", record.id),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "discovered");

    // Restoring an active record is refused.
    let response = post_json(
        &app.router,
        &format!("/api/v1/pipeline/{}/restore", record.id),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_requires_explicit_confirmation(pool: PgPool) {
    let user_id = Uuid::new_v4();
    let venue = seed_venue(&pool, "The Camel").await;
    let record = seed_record(&pool, user_id, venue.id).await;
    let app = build_test_app(pool);
    let token = token_for(user_id);

    let response = delete(&app.router, &format!("/api/v1/pipeline/{}", record.id), &token).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = delete(
        &app.router,
        &format!("/api/v1/pipeline/{}?confirm=true", record.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(
        &app.router,
        &format!("/api/v1/pipeline/{}?confirm=true", record.id),
        &token,
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
