//! OpenAPI Documentation
//!
//! Central OpenAPI specification for the job board APIs.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Job board API OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "JobForge API",
        version = "1.0.0",
        description = "REST APIs for job postings, applications, and company reviews"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "users", description = "User profiles"),
        (name = "jobs", description = "Job postings and lifecycle"),
        (name = "companies", description = "Company profiles and ratings"),
        (name = "applications", description = "Job applications"),
        (name = "saved-jobs", description = "Saved job bookmarks"),
        (name = "reviews", description = "Company reviews"),
        (name = "notifications", description = "In-app notifications")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Auth API
        super::auth::register,
        super::auth::login,
        super::auth::get_current_user,
        // Users API
        super::users::get_user,
        super::users::update_profile,
        super::users::deactivate_account,
        // Jobs API
        super::jobs::create_job,
        super::jobs::list_jobs,
        super::jobs::list_my_jobs,
        super::jobs::get_job,
        super::jobs::update_job,
        super::jobs::delete_job,
        super::jobs::publish_job,
        super::jobs::unpublish_job,
        super::jobs::close_job,
        super::jobs::expire_overdue,
        // Companies API
        super::companies::create_company,
        super::companies::list_companies,
        super::companies::get_company,
        super::companies::update_company,
        super::companies::delete_company,
        // Applications API
        super::applications::submit_application,
        super::applications::list_my_applications,
        super::applications::list_job_applications,
        super::applications::get_application,
        super::applications::update_status,
        super::applications::review_application,
        super::applications::shortlist_application,
        super::applications::reject_application,
        super::applications::accept_application,
        super::applications::withdraw_application,
        super::applications::mark_viewed,
        // Saved Jobs API
        super::saved_jobs::save_job,
        super::saved_jobs::unsave_job,
        super::saved_jobs::list_saved_jobs,
        // Reviews API
        super::reviews::create_review,
        super::reviews::list_company_reviews,
        super::reviews::get_review,
        super::reviews::update_review,
        super::reviews::delete_review,
        // Notifications API
        super::notifications::list_notifications,
        super::notifications::unread_count,
        super::notifications::mark_read,
        super::notifications::mark_all_read,
    ),
    components(
        schemas(
            // Auth schemas
            super::auth::RegisterRequest,
            super::auth::LoginRequest,
            super::auth::TokenResponse,
            super::auth::CurrentUserResponse,
            // User schemas
            super::users::UpdateProfileRequest,
            super::users::UserProfileResponse,
            // Job schemas
            super::jobs::CreateJobRequest,
            super::jobs::UpdateJobRequest,
            super::jobs::JobResponse,
            super::jobs::ExpireSweepResponse,
            // Company schemas
            super::companies::CreateCompanyRequest,
            super::companies::UpdateCompanyRequest,
            super::companies::CompanyResponse,
            // Application schemas
            super::applications::SubmitApplicationRequest,
            super::applications::UpdateStatusRequest,
            super::applications::RejectRequest,
            super::applications::StatusChangeResponse,
            super::applications::ApplicationResponse,
            // Saved job schemas
            super::saved_jobs::SavedJobResponse,
            // Review schemas
            super::reviews::CreateReviewRequest,
            super::reviews::UpdateReviewRequest,
            super::reviews::ReviewResponse,
            // Notification schemas
            super::notifications::NotificationResponse,
            super::notifications::UnreadCountResponse,
            // Common schemas
            super::common::ApiError,
            super::common::SuccessResponse,
            super::common::CreatedResponse,
        )
    )
)]
pub struct BoardApiDoc;
