//! Review persistence

use super::models::UserReview;
use crate::error::AuthError;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: &UserReview) -> Result<UserReview, AuthError>;

    /// Reviews about `subject_id`, newest first
    async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<UserReview>, AuthError>;

    async fn get(&self, id: Uuid) -> Result<Option<UserReview>, AuthError>;

    async fn update(&self, review: &UserReview) -> Result<UserReview, AuthError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AuthError>;
}

pub struct PgReviewStore {
    db: PgPool,
}

impl PgReviewStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn insert(&self, review: &UserReview) -> Result<UserReview, AuthError> {
        let review = sqlx::query_as::<_, UserReview>(
            r#"
            INSERT INTO user_reviews (id, reviewer_id, subject_id, rating, comment, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(&review.reviewer_id)
        .bind(&review.subject_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .fetch_one(&self.db)
        .await?;

        Ok(review)
    }

    async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<UserReview>, AuthError> {
        let reviews = sqlx::query_as(
            "SELECT * FROM user_reviews WHERE subject_id = $1 ORDER BY created_at DESC",
        )
        .bind(subject_id)
        .fetch_all(&self.db)
        .await?;
        Ok(reviews)
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserReview>, AuthError> {
        let review = sqlx::query_as("SELECT * FROM user_reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(review)
    }

    async fn update(&self, review: &UserReview) -> Result<UserReview, AuthError> {
        let review: UserReview = sqlx::query_as(
            r#"
            UPDATE user_reviews SET rating = $2, comment = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.updated_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AuthError::NotFound("Review".to_string()))?;

        Ok(review)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM user_reviews WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
