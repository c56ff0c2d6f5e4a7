//! API DTOs (Data Transfer Objects)

use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::application::AuthOutput;
use crate::application::token::BEARER_PREFIX;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Role name, defaults to `USER`
    #[serde(default, alias = "roleName")]
    pub user_role: Option<String>,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("user_role", &self.user_role)
            .finish()
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Token response (sign up and sign in)
// ============================================================================

/// Successful sign up / sign in response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// `"Bearer " + token`, ready for the `Authorization` header
    pub bearer_token: String,
    pub user_id: UserId,
    pub email: String,
}

impl From<AuthOutput> for AuthResponse {
    fn from(output: AuthOutput) -> Self {
        Self {
            bearer_token: format!("{}{}", BEARER_PREFIX, output.access_token),
            user_id: output.user_id,
            email: output.email.into_db(),
        }
    }
}

// ============================================================================
// Admin
// ============================================================================

/// Caller identity echoed by the admin ping route
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPingResponse {
    pub user_id: UserId,
    pub role: UserRole,
}
