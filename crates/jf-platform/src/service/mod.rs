//! Service Layer
//!
//! Business logic for the job board: authentication, lifecycle state
//! machines, rating aggregation, and best-effort notification dispatch.

pub mod auth;
pub mod password;
pub mod mailer;
pub mod notify;
pub mod job_lifecycle;
pub mod application_lifecycle;
pub mod rating;

pub use auth::{extract_bearer_token, AccessTokenClaims, AuthConfig, AuthContext, AuthService};
pub use password::PasswordService;
pub use mailer::{HttpMailer, Mailer, NoopMailer};
pub use notify::Notifier;
pub use job_lifecycle::{JobLifecycleService, NewJob, JobPatch};
pub use application_lifecycle::{ApplicationLifecycleService, NewApplication};
pub use rating::{average_rating, NewReview, RatingService, ReviewPatch};
