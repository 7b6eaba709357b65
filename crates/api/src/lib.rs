//! HTTP API for the venue booking pipeline.
//!
//! Exposes the router builder and supporting modules so integration
//! tests can assemble the exact production middleware stack.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
