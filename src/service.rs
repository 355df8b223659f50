//! Authentication Service
//!
//! Credential validation and token issuance against the local user
//! store, plus signup flows relayed to the identity provider.

use crate::error::{AuthError, ProviderError, SigningError};
use crate::models::*;
use crate::provider::IdentityProvider;
use crate::provisioning::ProfileProvisioner;
use crate::signer::TokenSigner;
use crate::store::UserStore;

use std::sync::Arc;

/// Role every registered account receives alongside its group
pub const BASE_ROLE: &str = "user";

/// Profile type assigned at registration
pub const DEFAULT_PROFILE_TYPE: &str = "doctor";

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    signer: Arc<dyn TokenSigner>,
    provider: Arc<dyn IdentityProvider>,
    provisioner: ProfileProvisioner,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn UserStore>,
        signer: Arc<dyn TokenSigner>,
        provider: Arc<dyn IdentityProvider>,
        provisioner: ProfileProvisioner,
    ) -> Self {
        Self {
            users,
            signer,
            provider,
            provisioner,
        }
    }

    /// Get reference to the profile provisioner
    pub fn provisioner(&self) -> &ProfileProvisioner {
        &self.provisioner
    }

    // ============================================
    // Credentials
    // ============================================

    /// Check a username/password pair.
    ///
    /// An unknown username and a wrong password fail with the same
    /// [`AuthError::InvalidCredentials`].
    pub async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserPrincipal, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.compare_password(password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let User {
            id,
            username,
            email,
            roles,
            ..
        } = user;

        Ok(UserPrincipal {
            id,
            username,
            email,
            roles,
        })
    }

    /// Issue an access token for a validated principal
    pub async fn login(&self, user: &UserPrincipal) -> Result<AccessToken, SigningError> {
        let payload = JwtPayload::from(user);
        let access_token = self.signer.sign(&payload).await?;

        tracing::info!(user_id = %user.id, "Access token issued");

        Ok(AccessToken { access_token })
    }

    // ============================================
    // Identity Provider Flows
    // ============================================

    /// Register with the identity provider, then queue the local profile.
    ///
    /// The provider response is returned as soon as the provider answers;
    /// profile creation completes (or fails) in the background.
    pub async fn register(
        &self,
        email: &str,
        attributes: &AttributePrincipal,
        group: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let response = self
            .provider
            .register_user(email, attributes, group)
            .await?;

        tracing::info!(user_id = %response.user_sub, group = %group, "User registered with identity provider");

        self.provisioner.submit(CreateProfileRequest {
            user_id: response.user_sub.clone(),
            first_name: attributes.given_name.clone(),
            last_name: attributes.family_name.clone(),
            email_id: email.to_string(),
            role: vec![group.to_string(), BASE_ROLE.to_string()],
            profile_type: DEFAULT_PROFILE_TYPE.to_string(),
            dob: String::new(),
            mobile_number: String::new(),
        });

        Ok(response)
    }

    /// Ask the identity provider to send a one-time password
    pub async fn request_otp(&self, email: &str) -> Result<serde_json::Value, ProviderError> {
        self.provider.request_otp(email).await
    }

    /// Relay a one-time password check to the identity provider
    pub async fn verify_otp(
        &self,
        payload: &VerifyRequest,
    ) -> Result<serde_json::Value, ProviderError> {
        self.provider.verify_otp(payload).await
    }
}
