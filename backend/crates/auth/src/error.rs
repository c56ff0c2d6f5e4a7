//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Every authentication/authorization failure is an expected outcome with
//! its own variant. Storage and signing faults form a separate
//! infrastructure class that is logged at error level and rendered as a
//! generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Fixed message returned with every 403 from the privileged-route gate
pub const FORBIDDEN_MESSAGE: &str = "Administrator privileges are required";

const CREDENTIALS_MESSAGE: &str = "Invalid email or password";
const UNAUTHENTICATED_MESSAGE: &str = "Authentication required";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Token validation and signing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a structurally valid token, or claims that cannot be decoded
    #[error("Malformed token")]
    MalformedToken,

    /// Signature does not match the server key
    #[error("Token signature is invalid")]
    SignatureInvalid,

    /// `exp` is in the past
    #[error("Token has expired")]
    Expired,

    /// The signing key could not be used (infrastructure)
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    /// Encoding a token failed (infrastructure)
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Token settings other than the key are unusable (infrastructure)
    #[error("Invalid token configuration: {0}")]
    InvalidConfig(String),
}

impl TokenError {
    /// Whether this is the caller's fault rather than the server's
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            TokenError::MalformedToken | TokenError::SignatureInvalid | TokenError::Expired
        )
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email is already registered
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Role name is not one of the known roles
    #[error("Invalid user role: {0}")]
    InvalidRole(String),

    /// No user with this email
    #[error("User not found")]
    UserNotFound,

    /// Password does not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No credentials were presented
    #[error("Authentication required")]
    Unauthenticated,

    /// Token rejected or could not be produced
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Authenticated but the role is insufficient
    #[error("{}", FORBIDDEN_MESSAGE)]
    Forbidden,

    /// Request input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::DuplicateEmail => ErrorKind::Conflict,
            AuthError::InvalidRole(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::UserNotFound
            | AuthError::InvalidCredentials
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::Token(e) if e.is_authentication_failure() => ErrorKind::Unauthorized,
            AuthError::Token(_) => ErrorKind::InternalServerError,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Infrastructure faults, as opposed to expected auth outcomes
    pub fn is_infrastructure(&self) -> bool {
        self.kind().is_server_error()
    }

    /// Message shown to the client
    ///
    /// Sign-in failures share one message so the response does not reveal
    /// whether the email is registered. Token failures all read the same so
    /// the response is not an oracle for forging attempts.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                CREDENTIALS_MESSAGE.to_string()
            }
            AuthError::Unauthenticated => UNAUTHENTICATED_MESSAGE.to_string(),
            AuthError::Token(e) if e.is_authentication_failure() => {
                UNAUTHENTICATED_MESSAGE.to_string()
            }
            e if e.is_infrastructure() => INTERNAL_MESSAGE.to_string(),
            e => e.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.client_message())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Token(e) if !e.is_authentication_failure() => {
                tracing::error!(error = %e, "Token infrastructure error");
            }
            AuthError::Token(e) => {
                tracing::warn!(reason = %e, "Rejected bearer token");
            }
            AuthError::UserNotFound => {
                tracing::warn!("Sign-in attempt for unknown email");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Sign-in attempt with wrong password");
            }
            // The gate writes its own warn-level audit line
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            AuthError::Internal(err.to_string())
        } else {
            AuthError::Validation(err.message().to_string())
        }
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::app_error::ErrorReport;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidRole("ROOT".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_failures_are_indistinguishable_to_clients() {
        let messages: Vec<String> = [
            TokenError::MalformedToken,
            TokenError::SignatureInvalid,
            TokenError::Expired,
        ]
        .into_iter()
        .map(|e| {
            let err = AuthError::from(e);
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            err.client_message()
        })
        .collect();

        assert!(messages.iter().all(|m| m == UNAUTHENTICATED_MESSAGE));
    }

    #[test]
    fn test_signing_failure_is_infrastructure() {
        let err = AuthError::from(TokenError::Signing("encoder exploded".into()));
        assert!(err.is_infrastructure());
        assert_eq!(err.client_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_invalid_token_config_is_infrastructure() {
        let err = AuthError::from(TokenError::InvalidConfig("token TTL must be positive".into()));
        assert!(err.is_infrastructure());
        assert_eq!(err.client_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn test_sign_in_failures_share_client_message() {
        assert_eq!(
            AuthError::UserNotFound.client_message(),
            AuthError::InvalidCredentials.client_message()
        );
        // Still distinguishable internally
        assert_ne!(
            AuthError::UserNotFound.to_string(),
            AuthError::InvalidCredentials.to_string()
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::Internal("connection string postgres://secret".into());
        assert!(!err.client_message().contains("secret"));
    }

    #[test]
    fn test_forbidden_response() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.message, FORBIDDEN_MESSAGE);
    }

    #[test]
    fn test_invalid_role_reports_offending_value() {
        let err = AuthError::InvalidRole("SUPERUSER".into());
        assert!(err.client_message().contains("SUPERUSER"));
    }
}
