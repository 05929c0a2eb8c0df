//! Common API types and utilities

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Standard API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 { 1 }
fn default_limit() -> u32 { 20 }

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Effective page size: the requested limit clamped to `1..=MAX_PAGE_SIZE`.
    /// A raw limit of 0 would disable the cursor limit entirely.
    pub fn per_page(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.per_page() as u64
    }

    pub fn limit_i64(&self) -> i64 {
        self.per_page() as i64
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;
        Self {
            data,
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Created response with ID
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

impl CreatedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let p = PaginationParams { page: 3, limit: 20 };
        assert_eq!(p.offset(), 40);
        let first = PaginationParams { page: 0, limit: 20 };
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn test_limit_zero_is_clamped_to_one() {
        let p = PaginationParams { page: 1, limit: 0 };
        assert_eq!(p.limit_i64(), 1);
        let resp: PaginatedResponse<u32> = PaginatedResponse::new(vec![], 1, 0, 50);
        assert_eq!(resp.limit, 1);
        assert_eq!(resp.total_pages, 50);
    }

    #[test]
    fn test_oversized_limit_is_capped_and_reported() {
        let p = PaginationParams { page: 2, limit: 1000 };
        assert_eq!(p.limit_i64(), 100);
        assert_eq!(p.offset(), 100);
        let resp: PaginatedResponse<u32> = PaginatedResponse::new(vec![], 2, 1000, 250);
        assert_eq!(resp.limit, 100);
        assert_eq!(resp.total_pages, 3);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp: PaginatedResponse<u32> = PaginatedResponse::new(vec![], 1, 20, 41);
        assert_eq!(resp.total_pages, 3);
    }
}
