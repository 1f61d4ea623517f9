//! Request handlers, one module per resource.
//!
//! Handlers stay thin: extract, call the matching service in
//! [`crate::services`], and wrap the result in a response envelope.

pub mod auth;
pub mod posts;
pub mod tags;
pub mod users;
pub mod versions;
