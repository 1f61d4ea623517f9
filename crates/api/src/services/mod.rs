//! Business rules between the handlers and the repositories.
//!
//! Each service is a zero-sized struct whose methods take the pool (and any
//! configuration they need) explicitly. Services own validation, ownership
//! checks and the mapping of missing rows to [`CoreError::NotFound`]; they
//! return [`AppResult`] so handlers can forward errors with `?`.
//!
//! [`CoreError::NotFound`]: quill_core::error::CoreError::NotFound
//! [`AppResult`]: crate::error::AppResult

pub mod posts;
pub mod tags;
pub mod users;
pub mod versions;

pub use posts::PostService;
pub use tags::TagService;
pub use users::UserService;
pub use versions::VersionService;
