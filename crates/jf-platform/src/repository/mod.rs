//! Repository Layer
//!
//! MongoDB repositories for all domain entities. Field names in filters are
//! the camelCase names the entities serialize to.

pub mod user;
pub mod company;
pub mod job;
pub mod application;
pub mod review;
pub mod notification;
pub mod saved_job;
pub mod indexes;

pub use user::{UserRepository, UserStore};
pub use company::{CompanyRepository, CompanyStore};
pub use job::{JobFilter, JobRepository, JobStore};
pub use application::{ApplicationRepository, ApplicationStore};
pub use review::ReviewRepository;
pub use notification::{NotificationRepository, NotificationStore};
pub use saved_job::{SavedJobRepository, SavedJobStore};
pub use indexes::ensure_indexes;
