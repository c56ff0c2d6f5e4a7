//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::application::{AuthService, SignInInput, SignUpInput};
use crate::domain::identity::RequestIdentity;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{AdminPingResponse, AuthResponse, SignInRequest, SignUpRequest};

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub service: Arc<AuthService<R>>,
}

// `R` itself need not be Clone; only the Arc is cloned
impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let input = SignUpInput {
        email: req.email,
        password: req.password,
        user_role: req.user_role,
    };

    let output = state.service.sign_up(input).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + Send + Sync + 'static,
{
    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    let output = state.service.sign_in(input).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Admin / Health
// ============================================================================

/// GET /admin/ping
///
/// Only reachable through the admin gate, so the identity is always an admin.
pub async fn admin_ping(identity: RequestIdentity) -> Json<AdminPingResponse> {
    Json(AdminPingResponse {
        user_id: identity.user_id,
        role: identity.role,
    })
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
