//! Review Service

use super::models::*;
use super::store::ReviewStore;
use crate::error::AuthError;
use crate::store::{AccountConfigStore, ProfileStore};

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserReviewService {
    profiles: Arc<dyn ProfileStore>,
    account_configs: Arc<dyn AccountConfigStore>,
    reviews: Arc<dyn ReviewStore>,
}

impl UserReviewService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        account_configs: Arc<dyn AccountConfigStore>,
        reviews: Arc<dyn ReviewStore>,
    ) -> Self {
        Self {
            profiles,
            account_configs,
            reviews,
        }
    }

    /// Create a review of `req.subject_id` authored by `reviewer_id`
    pub async fn create(
        &self,
        reviewer_id: &str,
        req: CreateReviewRequest,
    ) -> Result<UserReview, AuthError> {
        if reviewer_id == req.subject_id {
            return Err(AuthError::Validation(
                "Users cannot review themselves".to_string(),
            ));
        }

        if self.profiles.find_by_user_id(&req.subject_id).await?.is_none() {
            return Err(AuthError::NotFound("Profile".to_string()));
        }

        // No settings row means reviews are open.
        let reviews_enabled = self
            .account_configs
            .find_by_user_id(&req.subject_id)
            .await?
            .map_or(true, |c| c.reviews_enabled);
        if !reviews_enabled {
            return Err(AuthError::Forbidden(
                "This user does not accept reviews".to_string(),
            ));
        }

        let now = Utc::now();
        let review = self
            .reviews
            .insert(&UserReview {
                id: Uuid::new_v4(),
                reviewer_id: reviewer_id.to_string(),
                subject_id: req.subject_id,
                rating: req.rating,
                comment: req.comment,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(
            review_id = %review.id,
            subject_id = %review.subject_id,
            "Review created"
        );

        Ok(review)
    }

    pub async fn find_for_subject(&self, subject_id: &str) -> Result<Vec<UserReview>, AuthError> {
        self.reviews.list_for_subject(subject_id).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<UserReview, AuthError> {
        self.reviews
            .get(id)
            .await?
            .ok_or_else(|| AuthError::NotFound("Review".to_string()))
    }

    /// Update a review; only its author may do so
    pub async fn update(
        &self,
        id: Uuid,
        reviewer_id: &str,
        req: UpdateReviewRequest,
    ) -> Result<UserReview, AuthError> {
        let mut review = self.owned_review(id, reviewer_id).await?;

        if let Some(rating) = req.rating {
            review.rating = rating;
        }
        if let Some(comment) = req.comment {
            review.comment = comment;
        }
        review.updated_at = Utc::now();

        self.reviews.update(&review).await
    }

    /// Delete a review; only its author may do so
    pub async fn remove(&self, id: Uuid, reviewer_id: &str) -> Result<(), AuthError> {
        self.owned_review(id, reviewer_id).await?;

        if !self.reviews.delete(id).await? {
            return Err(AuthError::NotFound("Review".to_string()));
        }

        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }

    async fn owned_review(&self, id: Uuid, reviewer_id: &str) -> Result<UserReview, AuthError> {
        let review = self.find_one(id).await?;

        if review.reviewer_id != reviewer_id {
            tracing::warn!(review_id = %id, user_id = %reviewer_id, "Review modification by non-author");
            return Err(AuthError::Forbidden(
                "Only the author can modify this review".to_string(),
            ));
        }

        Ok(review)
    }
}
