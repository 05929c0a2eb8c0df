//! API Layer
//!
//! REST API endpoints for the job board.

pub mod common;
pub mod middleware;
pub mod openapi;

pub mod applications;
pub mod auth;
pub mod companies;
pub mod jobs;
pub mod notifications;
pub mod reviews;
pub mod saved_jobs;
pub mod users;

pub use common::*;
pub use middleware::{AppState, Authenticated, OptionalAuth};
pub use openapi::BoardApiDoc;

pub use applications::{applications_router, ApplicationsState};
pub use auth::{auth_router, AuthApiState};
pub use companies::{companies_router, CompaniesState};
pub use jobs::{jobs_router, JobsState};
pub use notifications::{notifications_router, NotificationsState};
pub use reviews::{reviews_router, ReviewsState};
pub use saved_jobs::{saved_jobs_router, SavedJobsState};
pub use users::{users_router, UsersState};
