//! Identity Provider
//!
//! Contract of the managed identity service that owns registration and
//! one-time-password delivery. The protocol lives behind this trait; the
//! host application supplies a client at construction time.

use crate::error::ProviderError;
use crate::models::{AttributePrincipal, ProviderUser, VerifyRequest};

use async_trait::async_trait;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a user and place them in `group`
    async fn register_user(
        &self,
        email: &str,
        attributes: &AttributePrincipal,
        group: &str,
    ) -> Result<ProviderUser, ProviderError>;

    /// Send a one-time password to `email`
    async fn request_otp(&self, email: &str) -> Result<serde_json::Value, ProviderError>;

    /// Check a one-time password
    async fn verify_otp(&self, payload: &VerifyRequest)
        -> Result<serde_json::Value, ProviderError>;
}
