//! Domain Models
//!
//! Core job-board entities. All entities use UUID string IDs stored as
//! `_id` and serialize with camelCase field names for the JSON API.

pub mod user;
pub mod company;
pub mod job;
pub mod application;
pub mod review;
pub mod notification;
pub mod saved_job;

pub use user::*;
pub use company::*;
pub use job::*;
pub use application::*;
pub use review::*;
pub use notification::*;
pub use saved_job::*;

/// Generate a new entity ID.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
