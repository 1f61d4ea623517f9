//! Domain primitives shared by the persistence and HTTP layers.
//!
//! Nothing in this crate performs I/O; it holds the error taxonomy, id and
//! timestamp aliases, the publication status enum, and the small pure rules
//! (tag normalization, pagination parsing, field validation) that both the
//! repositories and the handlers rely on.

pub mod error;
pub mod pagination;
pub mod status;
pub mod tags;
pub mod types;
pub mod validation;
