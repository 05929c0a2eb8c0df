//! Rating Aggregation
//!
//! Recomputes a company's average rating and review count from scratch
//! after every review mutation.

use std::sync::Arc;

use tracing::info;

use crate::domain::Review;
use crate::error::{BoardError, Result};
use crate::repository::{ApplicationRepository, CompanyRepository, JobRepository, ReviewRepository};
use crate::service::{AuthContext, Notifier};

pub struct NewReview {
    pub company_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    /// Job the reviewer was hired for, when cited
    pub job_id: Option<String>,
}

#[derive(Default)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

/// Arithmetic mean rounded to one decimal; 0.0 for an empty set.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub struct RatingService {
    review_repo: Arc<ReviewRepository>,
    company_repo: Arc<CompanyRepository>,
    job_repo: Arc<JobRepository>,
    application_repo: Arc<ApplicationRepository>,
    notifier: Arc<Notifier>,
}

impl RatingService {
    pub fn new(
        review_repo: Arc<ReviewRepository>,
        company_repo: Arc<CompanyRepository>,
        job_repo: Arc<JobRepository>,
        application_repo: Arc<ApplicationRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            review_repo,
            company_repo,
            job_repo,
            application_repo,
            notifier,
        }
    }

    pub async fn create_review(&self, reviewer: &AuthContext, input: NewReview) -> Result<Review> {
        let company = self
            .company_repo
            .find_by_id(&input.company_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Company", &input.company_id))?;

        // When a job is cited, the reviewer must hold an accepted
        // application for it and the job must belong to this company.
        if let Some(ref job_id) = input.job_id {
            let job = self
                .job_repo
                .find_by_id(job_id)
                .await?
                .ok_or_else(|| BoardError::not_found("Job", job_id))?;
            if job.company_id.as_deref() != Some(company.id.as_str()) {
                return Err(BoardError::validation("Cited job does not belong to this company"));
            }
            if !self
                .application_repo
                .accepted_exists(&reviewer.user_id, job_id)
                .await?
            {
                return Err(BoardError::forbidden(
                    "Reviewing a job requires an accepted application for it",
                ));
            }
        }

        if self
            .review_repo
            .exists_by_user_and_company(&reviewer.user_id, &company.id)
            .await?
        {
            return Err(BoardError::duplicate("Review", "companyId", &company.id));
        }

        let mut review = Review::new(&company.id, &reviewer.user_id, input.rating)?;
        if let Some(job_id) = input.job_id {
            review = review.with_job(job_id);
        }
        if let Some(title) = input.title {
            review = review.with_title(title);
        }
        if let Some(comment) = input.comment {
            review = review.with_comment(comment);
        }

        self.review_repo.insert(&review).await?;
        self.recompute_company_rating(&company.id).await?;
        info!(review_id = %review.id, company_id = %company.id, "review created");

        self.notifier.review_received(&company.owner_id, &review).await;

        Ok(review)
    }

    pub async fn update_review(&self, review_id: &str, actor_id: &str, patch: ReviewPatch) -> Result<Review> {
        let mut review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Review", review_id))?;

        if review.user_id != actor_id {
            return Err(BoardError::forbidden("Only the reviewer may edit this review"));
        }

        if let Some(rating) = patch.rating {
            review.set_rating(rating)?;
        }
        if let Some(title) = patch.title {
            review.title = Some(title);
        }
        if let Some(comment) = patch.comment {
            review.comment = Some(comment);
        }

        self.review_repo.update(&review).await?;
        self.recompute_company_rating(&review.company_id).await?;
        Ok(review)
    }

    pub async fn delete_review(&self, review_id: &str, actor_id: &str) -> Result<()> {
        let review = self
            .review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| BoardError::not_found("Review", review_id))?;

        if review.user_id != actor_id {
            return Err(BoardError::forbidden("Only the reviewer may delete this review"));
        }

        self.review_repo.delete(&review.id).await?;
        self.recompute_company_rating(&review.company_id).await?;
        info!(review_id = %review.id, "review deleted");
        Ok(())
    }

    /// Full scan of the company's reviews; writes mean (one decimal) and
    /// count onto the company record. Zero reviews resets to (0.0, 0).
    pub async fn recompute_company_rating(&self, company_id: &str) -> Result<()> {
        let ratings = self.review_repo.ratings_for_company(company_id).await?;
        let average = average_rating(&ratings);
        self.company_repo
            .set_rating_stats(company_id, average, ratings.len() as u64)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_three_and_five_is_four() {
        assert_eq!(average_rating(&[3, 5]), 4.0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        // 11/3 = 3.666... -> 3.7
        assert_eq!(average_rating(&[3, 4, 4]), 3.7);
        // 10/3 = 3.333... -> 3.3
        assert_eq!(average_rating(&[3, 3, 4]), 3.3);
    }

    #[test]
    fn test_average_of_empty_set_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average_single_rating() {
        assert_eq!(average_rating(&[5]), 5.0);
    }
}
