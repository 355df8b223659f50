//! In-memory collaborators for unit tests.

use crate::config::AuthConfig;
use crate::error::{AuthError, ProviderError, SigningError};
use crate::models::*;
use crate::password::hash_password;
use crate::provider::IdentityProvider;
use crate::review::{ReviewStore, UserReview};
use crate::signer::TokenSigner;
use crate::store::{AccountConfigStore, ProfileStore, UserStore};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Config with cheap Argon2 parameters
pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-at-least-32-chars".to_string(),
        access_token_expiration: 3600,
        jwt_issuer: "clinic-auth-test".to_string(),
        jwt_audience: "clinic-api-test".to_string(),
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

pub fn test_user(id: &str, username: &str, password: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@x.com"),
        roles: vec!["doctor".to_string()],
        password_hash: hash_password(password, &test_config()).unwrap(),
    }
}

pub fn profile_request(user_id: &str) -> CreateProfileRequest {
    CreateProfileRequest {
        user_id: user_id.to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email_id: "doc@x.com".to_string(),
        role: vec!["doctor".to_string(), "user".to_string()],
        profile_type: "doctor".to_string(),
        dob: String::new(),
        mobile_number: String::new(),
    }
}

fn unavailable() -> AuthError {
    AuthError::Database("connection refused".to_string())
}

// ============================================
// Users
// ============================================

#[derive(Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, User>,
    fail: bool,
}

impl InMemoryUserStore {
    pub fn with_user(user: User) -> Self {
        let mut users = HashMap::new();
        users.insert(user.username.clone(), user);
        Self { users, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            users: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        if self.fail {
            return Err(unavailable());
        }
        Ok(self.users.get(username).cloned())
    }
}

// ============================================
// Profiles and Account Settings
// ============================================

#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<Vec<CreateProfileRequest>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl InMemoryProfileStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_profile(user_id: &str) -> Self {
        let store = Self::default();
        store.profiles.lock().unwrap().push(profile_request(user_id));
        store
    }

    pub fn created(&self) -> Vec<CreateProfileRequest> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn to_profile(req: &CreateProfileRequest) -> Profile {
    Profile {
        user_id: req.user_id.clone(),
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email_id: req.email_id.clone(),
        roles: req.role.clone(),
        profile_type: req.profile_type.clone(),
        dob: req.dob.clone(),
        mobile_number: req.mobile_number.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn create(&self, req: &CreateProfileRequest) -> Result<Profile, AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(unavailable());
        }
        self.profiles.lock().unwrap().push(req.clone());
        Ok(to_profile(req))
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, AuthError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .map(to_profile))
    }
}

#[derive(Default)]
pub struct InMemoryAccountConfigStore {
    configs: HashMap<String, bool>,
}

impl InMemoryAccountConfigStore {
    pub fn with_reviews_enabled(user_id: &str, enabled: bool) -> Self {
        let mut configs = HashMap::new();
        configs.insert(user_id.to_string(), enabled);
        Self { configs }
    }
}

#[async_trait]
impl AccountConfigStore for InMemoryAccountConfigStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AccountConfig>, AuthError> {
        Ok(self.configs.get(user_id).map(|enabled| AccountConfig {
            user_id: user_id.to_string(),
            reviews_enabled: *enabled,
            updated_at: Utc::now(),
        }))
    }
}

// ============================================
// Reviews
// ============================================

#[derive(Default)]
pub struct InMemoryReviewStore {
    reviews: Mutex<Vec<UserReview>>,
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn insert(&self, review: &UserReview) -> Result<UserReview, AuthError> {
        self.reviews.lock().unwrap().push(review.clone());
        Ok(review.clone())
    }

    async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<UserReview>, AuthError> {
        let mut found: Vec<UserReview> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserReview>, AuthError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update(&self, review: &UserReview) -> Result<UserReview, AuthError> {
        let mut reviews = self.reviews.lock().unwrap();
        let slot = reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| AuthError::NotFound("Review".to_string()))?;
        *slot = review.clone();
        Ok(review.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let mut reviews = self.reviews.lock().unwrap();
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() != before)
    }
}

// ============================================
// Signer and Provider
// ============================================

#[derive(Default)]
pub struct RecordingSigner {
    payloads: Mutex<Vec<JwtPayload>>,
    fail: bool,
}

impl RecordingSigner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<JwtPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenSigner for RecordingSigner {
    async fn sign(&self, payload: &JwtPayload) -> Result<String, SigningError> {
        if self.fail {
            return Err(SigningError("key unavailable".to_string()));
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(format!("signed:{}", payload.sub))
    }
}

/// Provider that answers every call with one canned response
pub struct MockProvider {
    response: Result<serde_json::Value, ProviderError>,
    registrations: Mutex<Vec<(String, AttributePrincipal, String)>>,
    otp_requests: Mutex<Vec<String>>,
    verifications: Mutex<Vec<VerifyRequest>>,
}

impl MockProvider {
    fn new(response: Result<serde_json::Value, ProviderError>) -> Self {
        Self {
            response,
            registrations: Mutex::new(Vec::new()),
            otp_requests: Mutex::new(Vec::new()),
            verifications: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(response: serde_json::Value) -> Self {
        Self::new(Ok(response))
    }

    pub fn failing(err: ProviderError) -> Self {
        Self::new(Err(err))
    }

    pub fn registrations(&self) -> Vec<(String, AttributePrincipal, String)> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn otp_requests(&self) -> Vec<String> {
        self.otp_requests.lock().unwrap().clone()
    }

    pub fn verifications(&self) -> Vec<VerifyRequest> {
        self.verifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn register_user(
        &self,
        email: &str,
        attributes: &AttributePrincipal,
        group: &str,
    ) -> Result<ProviderUser, ProviderError> {
        self.registrations.lock().unwrap().push((
            email.to_string(),
            attributes.clone(),
            group.to_string(),
        ));
        let value = self.response.clone()?;
        serde_json::from_value(value).map_err(|e| ProviderError::Rejected {
            code: "InvalidResponse".to_string(),
            message: e.to_string(),
        })
    }

    async fn request_otp(&self, email: &str) -> Result<serde_json::Value, ProviderError> {
        self.otp_requests.lock().unwrap().push(email.to_string());
        self.response.clone()
    }

    async fn verify_otp(
        &self,
        payload: &VerifyRequest,
    ) -> Result<serde_json::Value, ProviderError> {
        self.verifications.lock().unwrap().push(payload.clone());
        self.response.clone()
    }
}
