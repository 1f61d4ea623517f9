//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must join a
//! caller's transaction take `&mut PgConnection` instead and are suffixed
//! `_in`.

pub mod post_repo;
pub mod post_version_repo;
pub mod tag_repo;
pub mod user_repo;

pub use post_repo::PostRepo;
pub use post_version_repo::PostVersionRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
