//! Persistence collaborators for users, profiles and account settings.

use crate::error::AuthError;
use crate::models::{AccountConfig, CreateProfileRequest, Profile, User};

use async_trait::async_trait;
use sqlx::PgPool;

/// Looks up users by username
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
}

/// Creates and reads user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create(&self, req: &CreateProfileRequest) -> Result<Profile, AuthError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, AuthError>;
}

/// Reads per-user account settings
#[async_trait]
pub trait AccountConfigStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AccountConfig>, AuthError>;
}

// ============================================
// Postgres
// ============================================

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as(
            "SELECT id, username, email, roles, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn create(&self, req: &CreateProfileRequest) -> Result<Profile, AuthError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, first_name, last_name, email_id, roles, profile_type, dob, mobile_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&req.user_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.email_id)
        .bind(&req.role)
        .bind(&req.profile_type)
        .bind(&req.dob)
        .bind(&req.mobile_number)
        .fetch_one(&self.db)
        .await?;

        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, AuthError> {
        let profile = sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(profile)
    }
}

pub struct PgAccountConfigStore {
    db: PgPool,
}

impl PgAccountConfigStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountConfigStore for PgAccountConfigStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<AccountConfig>, AuthError> {
        let config = sqlx::query_as("SELECT * FROM account_configs WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(config)
    }
}
