//! Company API Endpoints
//!
//! Company profiles and the derived rating stats. Profiles are public;
//! mutation is limited to the owning employer.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::api::middleware::Authenticated;
use crate::domain::Company;
use crate::error::BoardError;
use crate::repository::CompanyRepository;

/// Create company request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub industry: Option<String>,
}

/// Update company request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
}

/// Company response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    pub average_rating: f64,
    pub review_count: u64,
    pub active_jobs_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            owner_id: company.owner_id,
            name: company.name,
            description: company.description,
            website: company.website,
            location: company.location,
            industry: company.industry,
            average_rating: company.average_rating,
            review_count: company.review_count,
            active_jobs_count: company.active_jobs_count,
            created_at: company.created_at.to_rfc3339(),
            updated_at: company.updated_at.to_rfc3339(),
        }
    }
}

/// Companies service state
#[derive(Clone)]
pub struct CompaniesState {
    pub company_repo: Arc<CompanyRepository>,
}

async fn load_owned(
    repo: &CompanyRepository,
    company_id: &str,
    actor_id: &str,
) -> Result<Company, BoardError> {
    let company = repo
        .find_by_id(company_id)
        .await?
        .ok_or_else(|| BoardError::not_found("Company", company_id))?;
    if !company.is_owned_by(actor_id) {
        return Err(BoardError::forbidden(
            "Only the company owner may modify this company",
        ));
    }
    Ok(company)
}

/// Create a company profile
#[utoipa::path(
    post,
    path = "",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 200, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not an employer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    State(state): State<CompaniesState>,
    auth: Authenticated,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<CompanyResponse>, BoardError> {
    if !auth.0.is_employer() {
        return Err(BoardError::forbidden("Only employers may create companies"));
    }
    if req.name.trim().is_empty() {
        return Err(BoardError::validation("name is required"));
    }

    let mut company = Company::new(&auth.0.user_id, req.name.trim());
    if let Some(description) = req.description {
        company = company.with_description(description);
    }
    if let Some(website) = req.website {
        company = company.with_website(website);
    }
    if let Some(location) = req.location {
        company = company.with_location(location);
    }
    if let Some(industry) = req.industry {
        company = company.with_industry(industry);
    }

    state.company_repo.insert(&company).await?;
    Ok(Json(company.into()))
}

/// List companies
#[utoipa::path(
    get,
    path = "",
    tag = "companies",
    params(PaginationParams),
    responses(
        (status = 200, description = "List of companies", body = PaginatedResponse<CompanyResponse>)
    )
)]
pub async fn list_companies(
    State(state): State<CompaniesState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<CompanyResponse>>, BoardError> {
    let total = state.company_repo.count().await?;
    let companies = state
        .company_repo
        .find_page(pagination.offset(), pagination.limit_i64())
        .await?;

    let data = companies.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.limit,
        total,
    )))
}

/// Get a company by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "companies",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company details", body = CompanyResponse),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    State(state): State<CompaniesState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyResponse>, BoardError> {
    let company = state
        .company_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| BoardError::not_found("Company", &id))?;
    Ok(Json(company.into()))
}

/// Update a company profile
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "companies",
    params(("id" = String, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 403, description = "Not the company owner"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_company(
    State(state): State<CompaniesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, BoardError> {
    let mut company = load_owned(&state.company_repo, &id, &auth.0.user_id).await?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(BoardError::validation("name cannot be blank"));
        }
        company.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        company.description = Some(description);
    }
    if let Some(website) = req.website {
        company.website = Some(website);
    }
    if let Some(location) = req.location {
        company.location = Some(location);
    }
    if let Some(industry) = req.industry {
        company.industry = Some(industry);
    }
    company.updated_at = Utc::now();

    state.company_repo.update(&company).await?;
    Ok(Json(company.into()))
}

/// Delete a company profile
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "companies",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = SuccessResponse),
        (status = 403, description = "Not the company owner"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_company(
    State(state): State<CompaniesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, BoardError> {
    load_owned(&state.company_repo, &id, &auth.0.user_id).await?;
    state.company_repo.delete(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create the companies router
pub fn companies_router(state: CompaniesState) -> Router {
    Router::new()
        .route("/", post(create_company).get(list_companies))
        .route(
            "/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_response_conversion() {
        let company = Company::new("user-1", "Acme").with_industry("Software");
        let response = CompanyResponse::from(company);
        assert_eq!(response.name, "Acme");
        assert_eq!(response.industry.as_deref(), Some("Software"));
        assert_eq!(response.average_rating, 0.0);
        assert_eq!(response.review_count, 0);
    }

    #[test]
    fn test_update_request_partial() {
        let json = r#"{"website":"https://acme.example"}"#;
        let req: UpdateCompanyRequest = serde_json::from_str(json).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.website.as_deref(), Some("https://acme.example"));
    }
}
