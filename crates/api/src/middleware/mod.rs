//! Request extractors and middleware layers.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rate_limit`] -- Per-client-IP request limiting.
//! - [`logging`] -- Logs failed responses.

pub mod auth;
pub mod logging;
pub mod rate_limit;
