//! HTTP request handlers, grouped by resource.

pub mod email;
pub mod pipeline;
pub mod venues;
pub mod webhooks;
