//! User Reviews
//!
//! CRUD over reviews one user leaves about another. The unit is composed
//! from a profile lookup, account settings, review persistence and the
//! crate's tracing output, and is mounted by the host application.

pub mod handlers;
pub mod models;
pub mod service;
pub mod store;

pub use models::{CreateReviewRequest, UpdateReviewRequest, UserReview};
pub use service::UserReviewService;
pub use store::{PgReviewStore, ReviewStore};

use crate::middleware::VerifierState;
use crate::store::{AccountConfigStore, ProfileStore};

use axum::Router;
use std::sync::Arc;

/// Composition unit for the review service
pub struct UserReviewModule {
    service: Arc<UserReviewService>,
}

impl UserReviewModule {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        account_configs: Arc<dyn AccountConfigStore>,
        reviews: Arc<dyn ReviewStore>,
    ) -> Self {
        Self {
            service: Arc::new(UserReviewService::new(profiles, account_configs, reviews)),
        }
    }

    /// Service exported to the rest of the application
    pub fn service(&self) -> Arc<UserReviewService> {
        self.service.clone()
    }

    pub fn routes(&self, verifier: VerifierState) -> Router {
        handlers::create_routes(self.service.clone(), verifier)
    }
}
