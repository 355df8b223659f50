//! Authentication HTTP Handlers
//!
//! REST API endpoints for login, signup and OTP flows.

use crate::error::AuthError;
use crate::extractors::{AuthUser, ClientInfo};
use crate::middleware::{self, VerifierState};
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: AuthState, verifier: VerifierState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/otp/request", post(request_otp))
        .route("/auth/otp/verify", post(verify_otp));

    let protected = Router::new()
        .route("/auth/me", get(get_current_user))
        .layer(axum_middleware::from_fn_with_state(
            verifier,
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(auth_service)
}

// ============================================
// Login
// ============================================

/// POST /auth/login
///
/// Validate credentials and return a signed access token
pub async fn login(
    State(auth): State<AuthState>,
    ClientInfo { ip, .. }: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = match auth.validate_user(&req.username, &req.password).await {
        Ok(principal) => principal,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(ip = ?ip, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };

    let token = auth.login(&principal).await?;

    Ok(Json(token))
}

// ============================================
// Signup
// ============================================

/// POST /auth/register
///
/// Register with the identity provider; responds with the provider's answer
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let response = auth
        .register(&req.email, &req.attributes, &req.group)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/otp/request
pub async fn request_otp(
    State(auth): State<AuthState>,
    Json(req): Json<OtpRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let response = auth.request_otp(&req.email).await?;

    Ok(Json(response))
}

/// POST /auth/otp/verify
pub async fn verify_otp(
    State(auth): State<AuthState>,
    Json(req): Json<VerifyRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let response = auth.verify_otp(&req).await?;

    Ok(Json(response))
}

// ============================================
// Current User
// ============================================

/// GET /auth/me
pub async fn get_current_user(user: AuthUser) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(serde_json::json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "roles": user.roles
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provisioning::ProfileProvisioner;
    use crate::signer::JwtSigner;
    use crate::test_support::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(provider: MockProvider) -> Router {
        let signer = Arc::new(JwtSigner::new(&test_config()));
        let service = AuthService::new(
            Arc::new(InMemoryUserStore::with_user(test_user("u1", "alice", "secret"))),
            signer.clone(),
            Arc::new(provider),
            ProfileProvisioner::spawn(Arc::new(InMemoryProfileStore::default())),
        );
        create_routes(Arc::new(service), signer)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn login_then_me() {
        let app = app(MockProvider::returning(json!({ "UserSub": "sub-1" })));

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({ "username": "alice", "password": "secret" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::get("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "user": {
                    "id": "u1",
                    "username": "alice",
                    "email": "alice@x.com",
                    "roles": ["doctor"]
                }
            })
        );
    }

    #[tokio::test]
    async fn failed_logins_share_one_response() {
        let app = app(MockProvider::returning(json!({ "UserSub": "sub-1" })));

        let unknown = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({ "username": "bob", "password": "secret" }),
            ))
            .await
            .unwrap();
        let mismatch = app
            .oneshot(post_json(
                "/auth/login",
                json!({ "username": "alice", "password": "wrong" }),
            ))
            .await
            .unwrap();

        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(mismatch.status(), StatusCode::UNAUTHORIZED);

        let expected = json!({
            "error": "unauthorized",
            "message": "username or password is not matched"
        });
        assert_eq!(body_json(unknown).await, expected);
        assert_eq!(body_json(mismatch).await, expected);
    }

    #[tokio::test]
    async fn me_requires_token() {
        let app = app(MockProvider::returning(json!({ "UserSub": "sub-1" })));

        let response = app
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_returns_provider_response() {
        let app = app(MockProvider::returning(
            json!({ "UserSub": "sub-1", "UserConfirmed": false }),
        ));

        let response = app
            .oneshot(post_json(
                "/auth/register",
                json!({
                    "email": "doc@x.com",
                    "attributes": { "given_name": "A", "family_name": "B" },
                    "group": "doctor"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({ "UserSub": "sub-1", "UserConfirmed": false })
        );
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let app = app(MockProvider::returning(json!({ "UserSub": "sub-1" })));

        let response = app
            .oneshot(post_json(
                "/auth/register",
                json!({
                    "email": "not-an-email",
                    "attributes": { "given_name": "A", "family_name": "B" },
                    "group": "doctor"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_rejection_is_surfaced() {
        let app = app(MockProvider::failing(ProviderError::Rejected {
            code: "CodeMismatchException".into(),
            message: "Invalid verification code provided".into(),
        }));

        let response = app
            .oneshot(post_json(
                "/auth/otp/verify",
                json!({ "email": "doc@x.com", "code": "000000" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "CodeMismatchException",
                "message": "Invalid verification code provided"
            })
        );
    }
}
