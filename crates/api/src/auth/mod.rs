//! Authentication: JWT generation/validation.

pub mod jwt;
