//! Request-level middleware: authentication extractor.

pub mod auth;
