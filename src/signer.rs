//! Token Signing
//!
//! HS256 access tokens. The signer wraps the caller's payload with the
//! registered claims (`iat`, `exp`, `iss`, `aud`, `jti`).

use crate::config::AuthConfig;
use crate::error::{AuthError, SigningError};
use crate::models::{AccessTokenClaims, JwtPayload};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Produces a signed token for a claims payload
#[async_trait]
pub trait TokenSigner: Send + Sync {
    async fn sign(&self, payload: &JwtPayload) -> Result<String, SigningError>;
}

/// Checks a bearer token and returns its claims
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError>;
}

/// `jsonwebtoken`-backed signer and verifier
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: i64,
    issuer: String,
    audience: String,
}

impl JwtSigner {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiration: config.access_token_expiration,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        }
    }

    fn claims(&self, payload: &JwtPayload) -> AccessTokenClaims {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expiration);

        AccessTokenClaims {
            payload: payload.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        }
    }
}

#[async_trait]
impl TokenSigner for JwtSigner {
    async fn sign(&self, payload: &JwtPayload) -> Result<String, SigningError> {
        let claims = self.claims(payload);
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }
}

impl TokenVerifier for JwtSigner {
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}
