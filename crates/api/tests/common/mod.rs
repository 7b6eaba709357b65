//! Shared test harness: builds the production router with a mock mailer
//! and provides request/seeding helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use gigseeker_api::auth::jwt::{generate_access_token, JwtConfig};
use gigseeker_api::config::ServerConfig;
use gigseeker_api::mailer::{Mailer, MockMailer};
use gigseeker_api::router::build_app_router;
use gigseeker_api::state::AppState;
use gigseeker_core::quota::SubscriptionTier;
use gigseeker_core::status::PipelineStatus;
use gigseeker_db::models::pipeline_venue::{CreatePipelineVenue, PipelineVenue};
use gigseeker_db::models::profile::{CreateProfile, Profile};
use gigseeker_db::models::venue::{CreateVenue, Venue};
use gigseeker_db::repositories::{PipelineVenueRepo, ProfileRepo, VenueRepo};
use gigseeker_events::EventBus;

/// Shared secret used by webhook tests.
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// The assembled application plus handles the tests need to observe
/// side effects.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<MockMailer>,
    pub event_bus: Arc<EventBus>,
}

/// Build the full application router with all middleware layers, using
/// the given database pool and an in-memory mailer.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(MockMailer::new());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        mailer: Arc::clone(&mailer) as Arc<dyn Mailer>,
    };

    TestApp {
        router: build_app_router(state, &config),
        mailer,
        event_bus,
    }
}

/// Mint a valid bearer token for the given user.
pub fn token_for(user_id: Uuid) -> String {
    generate_access_token(user_id, &test_config().jwt).expect("token generation")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

pub async fn get(router: &Router, uri: &str, token: &str) -> Response<Body> {
    send(router, Method::GET, uri, Some(token), None).await
}

pub async fn get_unauthed(router: &Router, uri: &str) -> Response<Body> {
    send(router, Method::GET, uri, None, None).await
}

pub async fn post_json(
    router: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(router, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json(
    router: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(router, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(router: &Router, uri: &str, token: &str) -> Response<Body> {
    send(router, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a response carries the expected status and error code.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

pub async fn seed_venue(pool: &PgPool, name: &str) -> Venue {
    VenueRepo::create(
        pool,
        &CreateVenue {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            city: "Richmond".to_string(),
            state: "VA".to_string(),
            genres: vec!["indie".to_string()],
            website: None,
            description: None,
            capacity: Some(200),
        },
    )
    .await
    .expect("seed venue")
}

pub async fn seed_profile(pool: &PgPool, user_id: Uuid, tier: SubscriptionTier) -> Profile {
    ProfileRepo::create(
        pool,
        &CreateProfile {
            user_id,
            display_name: Some("Test Band".to_string()),
            booking_email: Some("band@example.com".to_string()),
            subscription_tier: Some(tier),
        },
    )
    .await
    .expect("seed profile")
}

pub async fn seed_record(pool: &PgPool, user_id: Uuid, venue_id: Uuid) -> PipelineVenue {
    PipelineVenueRepo::create(
        pool,
        user_id,
        &CreatePipelineVenue {
            venue_id,
            priority: None,
        },
    )
    .await
    .expect("seed pipeline record")
}

/// Force a record into a status, bypassing transition checks (test setup only).
pub async fn set_status(pool: &PgPool, id: Uuid, user_id: Uuid, status: PipelineStatus) {
    PipelineVenueRepo::update_status_for_user(pool, id, user_id, status)
        .await
        .expect("set status")
        .expect("record exists");
}
