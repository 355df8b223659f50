//! Authentication Models
//!
//! Data structures for authentication requests, responses, provider
//! payloads and database entities.

use crate::error::AuthError;
use crate::password;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ============================================
// Database Entities
// ============================================

/// User entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Compare a plaintext candidate against the stored credential.
    pub async fn compare_password(&self, candidate: &str) -> Result<bool, AuthError> {
        let candidate = candidate.to_owned();
        let hash = self.password_hash.clone();

        tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Password comparison task failed: {:?}", e);
                AuthError::Internal
            })
    }
}

/// Profile entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_id: String,
    #[serde(rename = "role")]
    pub roles: Vec<String>,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub dob: String,
    pub mobile_number: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user account settings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountConfig {
    pub user_id: String,
    pub reviews_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

// ============================================
// Principal and Tokens
// ============================================

/// Authenticated identity projected from a [`User`], without credential material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrincipal {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Claims handed to the token signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPayload {
    /// Human readable principal name
    pub upn: String,
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&UserPrincipal> for JwtPayload {
    fn from(user: &UserPrincipal) -> Self {
        Self {
            upn: user.username.clone(),
            sub: user.id.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Signed access token returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Full claim set of a signed access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(flatten)]
    pub payload: JwtPayload,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: Uuid,
}

// ============================================
// Identity Provider Payloads
// ============================================

/// Name attributes forwarded to the identity provider unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AttributePrincipal {
    #[validate(length(min = 1, max = 100, message = "given_name must be 1-100 characters"))]
    pub given_name: String,

    #[validate(length(min = 1, max = 100, message = "family_name must be 1-100 characters"))]
    pub family_name: String,
}

/// Registration response from the identity provider.
///
/// Only the subject identifier is interpreted; every other field is
/// carried through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    #[serde(rename = "UserSub")]
    pub user_sub: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// OTP verification payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

/// Profile created for a freshly registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_id: String,
    pub role: Vec<String>,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub dob: String,
    pub mobile_number: String,
}

// ============================================
// Request DTOs
// ============================================

/// Login request
///
/// Carries no validators: empty values fall through to the same generic
/// credential failure as any other mismatch.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(nested)]
    pub attributes: AttributePrincipal,

    #[validate(length(min = 1, max = 64, message = "Group must be 1-64 characters"))]
    pub group: String,
}

/// OTP request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
