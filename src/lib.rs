//! Clinic Authentication
//!
//! Authentication and signup backend for the clinic application:
//! - Username/password validation with a uniform failure for unknown
//!   users and wrong passwords
//! - JWT access tokens with `upn`, `sub`, `email` and `roles` claims
//! - Registration and OTP flows relayed to a managed identity provider
//! - Background profile provisioning after registration
//! - User reviews CRUD
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 3600)
//! - `JWT_ISSUER` - JWT issuer claim (default: "clinic-auth")
//! - `JWT_AUDIENCE` - JWT audience claim (default: "clinic-api")
//! - `ARGON2_MEMORY_COST`, `ARGON2_TIME_COST`, `ARGON2_PARALLELISM` - hashing cost
//!
//! # Usage
//!
//! ```rust,ignore
//! use clinic_auth::{AuthPlugin, Plugin};
//!
//! let plugin = AuthPlugin::new(Arc::new(my_identity_provider));
//! plugin.activate(db_pool).await?;
//!
//! let app = plugin.routes().expect("plugin is active");
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod provider;
pub mod provisioning;
pub mod review;
pub mod service;
pub mod signer;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::{AuthError, ProviderError, SigningError};
pub use extractors::{AuthUser, ClientInfo};
pub use handlers::AuthState;
pub use models::*;
pub use provider::IdentityProvider;
pub use provisioning::{ProfileProvisioner, ProvisionOutcome};
pub use review::{UserReviewModule, UserReviewService};
pub use service::AuthService;
pub use signer::{JwtSigner, TokenSigner, TokenVerifier};

use async_trait::async_trait;
use axum::Router;
use middleware::VerifierState;
use sqlx::PgPool;
use std::sync::{Arc, PoisonError};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

// ============================================
// Plugin Types
// ============================================

/// Plugin state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Inactive,
    Active,
    Error,
}

/// Plugin metadata
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Plugin lifecycle trait
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin information
    fn info(&self) -> &PluginInfo;

    /// Get current plugin state
    async fn state(&self) -> PluginState;

    /// Activate the plugin
    async fn activate(&self, db: PgPool) -> Result<(), AuthError>;

    /// Deactivate the plugin
    async fn deactivate(&self) -> Result<(), AuthError>;

    /// Get plugin routes; `None` while inactive. Never blocks on an
    /// in-flight activation or deactivation.
    fn routes(&self) -> Option<Router>;
}

// ============================================
// Auth Plugin Implementation
// ============================================

/// Services wired during activation
#[derive(Clone)]
struct Components {
    auth_service: Arc<AuthService>,
    reviews: Arc<UserReviewModule>,
    verifier: VerifierState,
}

/// Clinic authentication plugin
pub struct AuthPlugin {
    info: PluginInfo,
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<PluginState>,
    config: RwLock<Option<AuthConfig>>,
    components: RwLock<Option<Components>>,
    /// Router built on activation, readable from the sync `routes()` call
    router: std::sync::RwLock<Option<Router>>,
}

impl AuthPlugin {
    /// Create a new plugin that relays signup flows to `provider`
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            info: PluginInfo {
                id: "clinic-auth".into(),
                name: "Clinic Authentication".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                description: "Authentication, signup and user reviews".into(),
            },
            provider,
            state: RwLock::new(PluginState::Inactive),
            config: RwLock::new(None),
            components: RwLock::new(None),
            router: std::sync::RwLock::new(None),
        }
    }

    /// Get the authentication configuration
    pub async fn config(&self) -> Option<AuthConfig> {
        self.config.read().await.clone()
    }

    /// Get the authentication service
    pub async fn auth_service(&self) -> Option<Arc<AuthService>> {
        self.components
            .read()
            .await
            .as_ref()
            .map(|c| c.auth_service.clone())
    }

    /// Get the review module
    pub async fn reviews(&self) -> Option<Arc<UserReviewModule>> {
        self.components
            .read()
            .await
            .as_ref()
            .map(|c| c.reviews.clone())
    }

    /// Run database migrations
    async fn run_migrations(&self, db: &PgPool) -> Result<(), AuthError> {
        tracing::info!("Running authentication database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username VARCHAR(255) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL,
                roles TEXT[] NOT NULL DEFAULT '{}',
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                first_name VARCHAR(100) NOT NULL,
                last_name VARCHAR(100) NOT NULL,
                email_id VARCHAR(255) NOT NULL,
                roles TEXT[] NOT NULL DEFAULT '{}',
                profile_type VARCHAR(50) NOT NULL,
                dob VARCHAR(32) NOT NULL DEFAULT '',
                mobile_number VARCHAR(32) NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS account_configs (
                user_id TEXT PRIMARY KEY,
                reviews_enabled BOOLEAN NOT NULL DEFAULT TRUE,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_reviews (
                id UUID PRIMARY KEY,
                reviewer_id TEXT NOT NULL,
                subject_id TEXT NOT NULL,
                rating SMALLINT NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            "#,
        )
        .execute(db)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_user_reviews_subject ON user_reviews(subject_id, created_at DESC);",
        )
        .execute(db)
        .await?;

        tracing::info!("Authentication migrations completed successfully");
        Ok(())
    }

    fn wire(&self, db: PgPool, config: &AuthConfig) -> Components {
        let signer = Arc::new(JwtSigner::new(config));
        let profiles: Arc<dyn store::ProfileStore> = Arc::new(store::PgProfileStore::new(db.clone()));

        let auth_service = Arc::new(AuthService::new(
            Arc::new(store::PgUserStore::new(db.clone())),
            signer.clone(),
            self.provider.clone(),
            ProfileProvisioner::spawn(profiles.clone()),
        ));

        let reviews = Arc::new(UserReviewModule::new(
            profiles,
            Arc::new(store::PgAccountConfigStore::new(db.clone())),
            Arc::new(review::PgReviewStore::new(db)),
        ));

        Components {
            auth_service,
            reviews,
            verifier: signer,
        }
    }

    async fn install(&self, config: AuthConfig, components: Components) {
        let router = create_routes(
            components.auth_service.clone(),
            components.reviews.as_ref(),
            components.verifier.clone(),
        );

        *self.config.write().await = Some(config);
        *self.components.write().await = Some(components);
        *self.router.write().unwrap_or_else(PoisonError::into_inner) = Some(router);
        *self.state.write().await = PluginState::Active;
    }
}

#[async_trait]
impl Plugin for AuthPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    async fn activate(&self, db: PgPool) -> Result<(), AuthError> {
        tracing::info!("Activating Clinic Authentication plugin");

        let result = async {
            self.run_migrations(&db).await?;

            let config = AuthConfig::from_env()?;
            config.validate()?;
            Ok::<_, AuthError>(config)
        }
        .await;

        let config = match result {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Clinic Authentication plugin failed to activate");
                *self.state.write().await = PluginState::Error;
                return Err(e);
            }
        };

        let components = self.wire(db, &config);
        self.install(config, components).await;

        tracing::info!("Clinic Authentication plugin activated successfully");
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), AuthError> {
        tracing::info!("Deactivating Clinic Authentication plugin");

        // Dropping the services closes the provisioning queue.
        *self.router.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.components.write().await = None;
        *self.config.write().await = None;
        *self.state.write().await = PluginState::Inactive;

        tracing::info!("Clinic Authentication plugin deactivated");
        Ok(())
    }

    fn routes(&self) -> Option<Router> {
        self.router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Create the authentication and review routes
pub fn create_routes(
    auth_service: Arc<AuthService>,
    reviews: &UserReviewModule,
    verifier: VerifierState,
) -> Router {
    handlers::create_routes(auth_service, verifier.clone())
        .merge(reviews.routes(verifier))
        .layer(TraceLayer::new_for_http())
}

// ============================================
// Module Tests
// ============================================
