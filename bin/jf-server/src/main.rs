//! JobForge Server
//!
//! Production server for the job board REST APIs:
//! - Auth and user profiles
//! - Job postings with the publish/close/expire lifecycle
//! - Applications with status history and the accept cascade
//! - Companies with aggregated review ratings
//! - Saved jobs and notifications
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `JF_API_PORT` | `8080` | HTTP API port |
//! | `JF_METRICS_PORT` | `9090` | Metrics/health port |
//! | `JF_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `JF_MONGO_DB` | `jobforge` | MongoDB database name |
//! | `JF_JWT_SECRET` | - | HS256 signing secret (required) |
//! | `JF_JWT_ISSUER` | `jobforge` | JWT issuer claim |
//! | `JF_EMAIL_ENDPOINT` | - | Mail relay URL; emails are logged when unset |
//! | `JF_EMAIL_FROM` | `no-reply@jobforge.dev` | Sender address |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Extension, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use jf_platform::api::{
    applications_router, auth_router, companies_router, jobs_router, notifications_router,
    reviews_router, saved_jobs_router, users_router, ApplicationsState, AppState, AuthApiState,
    BoardApiDoc, CompaniesState, JobsState, NotificationsState, ReviewsState, SavedJobsState,
    UsersState,
};
use jf_platform::repository::{
    ensure_indexes, ApplicationRepository, CompanyRepository, JobRepository,
    NotificationRepository, ReviewRepository, SavedJobRepository, UserRepository,
};
use jf_platform::service::{
    ApplicationLifecycleService, AuthConfig, AuthService, HttpMailer, JobLifecycleService, Mailer,
    NoopMailer, Notifier, PasswordService, RatingService,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting JobForge Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("JF_API_PORT", 8080);
    let metrics_port: u16 = env_or_parse("JF_METRICS_PORT", 9090);
    let mongo_url = env_or("JF_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("JF_MONGO_DB", "jobforge");
    let jwt_secret =
        std::env::var("JF_JWT_SECRET").context("JF_JWT_SECRET must be set")?;
    let jwt_issuer = env_or("JF_JWT_ISSUER", "jobforge");

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    ensure_indexes(&db).await?;
    info!("Indexes ensured");

    // Initialize repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let company_repo = Arc::new(CompanyRepository::new(&db));
    let job_repo = Arc::new(JobRepository::new(&db));
    let application_repo = Arc::new(ApplicationRepository::new(&db));
    let review_repo = Arc::new(ReviewRepository::new(&db));
    let notification_repo = Arc::new(NotificationRepository::new(&db));
    let saved_job_repo = Arc::new(SavedJobRepository::new(&db));
    info!("Repositories initialized");

    // Initialize services
    let auth_config = AuthConfig {
        secret_key: jwt_secret,
        issuer: jwt_issuer,
        ..AuthConfig::default()
    };
    let auth_service = Arc::new(AuthService::new(auth_config));
    let password_service = Arc::new(PasswordService::default());

    let mailer: Arc<dyn Mailer> = match std::env::var("JF_EMAIL_ENDPOINT") {
        Ok(endpoint) => {
            let from = env_or("JF_EMAIL_FROM", "no-reply@jobforge.dev");
            info!("Email relay configured: {}", endpoint);
            Arc::new(HttpMailer::new(endpoint, from))
        }
        Err(_) => {
            info!("No email relay configured, emails will be logged");
            Arc::new(NoopMailer)
        }
    };

    let notifier = Arc::new(Notifier::new(
        notification_repo.clone(),
        user_repo.clone(),
        mailer,
    ));
    let job_lifecycle = Arc::new(JobLifecycleService::new(
        job_repo.clone(),
        company_repo.clone(),
    ));
    let application_lifecycle = Arc::new(ApplicationLifecycleService::new(
        application_repo.clone(),
        job_repo.clone(),
        job_lifecycle.clone(),
        notifier.clone(),
    ));
    let rating_service = Arc::new(RatingService::new(
        review_repo.clone(),
        company_repo.clone(),
        job_repo.clone(),
        application_repo.clone(),
        notifier,
    ));
    info!("Services initialized");

    // Shared request state for the auth extractors
    let app_state = AppState {
        auth_service: auth_service.clone(),
    };

    // Build API states
    let auth_state = AuthApiState {
        auth_service,
        user_repo: user_repo.clone(),
        password_service,
    };
    let users_state = UsersState { user_repo };
    let jobs_state = JobsState {
        job_lifecycle,
        job_repo: job_repo.clone(),
    };
    let companies_state = CompaniesState { company_repo };
    let applications_state = ApplicationsState {
        application_lifecycle,
        application_repo,
        job_repo: job_repo.clone(),
    };
    let saved_jobs_state = SavedJobsState {
        saved_job_repo,
        job_repo,
    };
    let reviews_state = ReviewsState {
        rating_service,
        review_repo,
    };
    let notifications_state = NotificationsState { notification_repo };

    // Build API router
    let app = Router::new()
        .nest("/api/v1/auth", auth_router(auth_state))
        .nest("/api/v1/users", users_router(users_state))
        .nest("/api/v1/jobs", jobs_router(jobs_state))
        .nest("/api/v1/companies", companies_router(companies_state))
        .nest("/api/v1/applications", applications_router(applications_state))
        .nest("/api/v1/saved-jobs", saved_jobs_router(saved_jobs_state))
        .nest("/api/v1/reviews", reviews_router(reviews_state))
        .nest("/api/v1/notifications", notifications_router(notifications_state))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", BoardApiDoc::openapi()))
        // Auth extractors read AppState from request extensions
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        axum::serve(api_listener, app).await.unwrap();
    });

    // Start metrics server
    let metrics_addr = format!("0.0.0.0:{}", metrics_port);
    info!("Metrics server listening on http://{}/metrics", metrics_addr);

    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    let metrics_listener = TcpListener::bind(&metrics_addr).await?;
    let metrics_task = tokio::spawn(async move {
        axum::serve(metrics_listener, metrics_app).await.unwrap();
    });

    info!("JobForge Server started");
    info!("Press Ctrl+C to shutdown");

    // Wait for shutdown
    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();
    metrics_task.abort();

    info!("JobForge Server shutdown complete");
    Ok(())
}

async fn metrics_handler() -> &'static str {
    "# HELP jobforge_up Server is up\n# TYPE jobforge_up gauge\njobforge_up 1\n"
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
