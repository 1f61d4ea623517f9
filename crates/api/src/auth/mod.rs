//! Authentication primitives.
//!
//! - [`password`] -- bcrypt password hashing and verification.
//! - [`jwt`] -- HS256 access-token issuing and validation.

pub mod jwt;
pub mod password;
