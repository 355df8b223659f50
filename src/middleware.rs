//! Authentication Middleware
//!
//! Bearer token verification for protected routes.

use crate::error::AuthError;
use crate::models::AccessTokenClaims;
use crate::signer::TokenVerifier;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Verifier shared with the middleware layer
pub type VerifierState = Arc<dyn TokenVerifier>;

/// Extract and validate JWT token from Authorization header
fn validate_token(
    verifier: &dyn TokenVerifier,
    auth_header: Option<&str>,
) -> Result<AccessTokenClaims, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthorized("Authentication required".to_string()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    verifier.verify(token)
}

/// Require authenticated user
///
/// Validates the JWT token from the Authorization header and stores
/// the claims in request extensions for use by extractors.
pub async fn require_auth(
    State(verifier): State<VerifierState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let claims = validate_token(verifier.as_ref(), auth_header)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
