//! Review Handlers

use super::models::*;
use super::service::UserReviewService;
use crate::error::AuthError;
use crate::extractors::AuthUser;
use crate::middleware::{self, VerifierState};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub type ReviewState = Arc<UserReviewService>;

/// Review routes; every route requires a bearer token
pub fn create_routes(reviews: ReviewState, verifier: VerifierState) -> Router {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/subject/:subject_id", get(list_reviews))
        .route(
            "/reviews/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
        .layer(axum_middleware::from_fn_with_state(
            verifier,
            middleware::require_auth,
        ))
        .with_state(reviews)
}

/// POST /reviews
pub async fn create_review(
    State(reviews): State<ReviewState>,
    user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let review = reviews.create(&user.id, req).await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /reviews/subject/:subject_id
pub async fn list_reviews(
    State(reviews): State<ReviewState>,
    Path(subject_id): Path<String>,
) -> Result<impl IntoResponse, AuthError> {
    let found = reviews.find_for_subject(&subject_id).await?;
    Ok(Json(serde_json::json!({
        "data": found,
        "count": found.len()
    })))
}

/// GET /reviews/:id
pub async fn get_review(
    State(reviews): State<ReviewState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let review = reviews.find_one(id).await?;
    Ok(Json(review))
}

/// PUT /reviews/:id
pub async fn update_review(
    State(reviews): State<ReviewState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let review = reviews.update(id, &user.id, req).await?;
    Ok(Json(review))
}

/// DELETE /reviews/:id
pub async fn delete_review(
    State(reviews): State<ReviewState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    reviews.remove(id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
