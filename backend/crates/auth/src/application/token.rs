//! Access Tokens
//!
//! Stateless HS256 JWTs carrying the caller's identity and role. The server
//! keeps no session record; a token is valid until its `exp`.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::application::config::{AuthConfig, MIN_TOKEN_SECRET_LEN};
use crate::domain::identity::RequestIdentity;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::TokenError;

/// Prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    pub email: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    pub iss: String,
}

impl From<&Claims> for RequestIdentity {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}

/// Issues and validates access tokens
///
/// The key is read-only after construction, so one instance is shared by
/// every request.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, TokenError> {
        if config.token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(TokenError::InvalidKey(format!(
                "token secret must be at least {} bytes (got {})",
                MIN_TOKEN_SECRET_LEN,
                config.token_secret.len()
            )));
        }

        let ttl_secs = config.token_ttl_secs();
        if ttl_secs <= 0 {
            return Err(TokenError::InvalidConfig("token TTL must be positive".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[config.token_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);

        tracing::info!(ttl_secs, issuer = %config.token_issuer, "Token service initialized with HS256 key");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.token_secret),
            decoding_key: DecodingKey::from_secret(&config.token_secret),
            validation,
            issuer: config.token_issuer.clone(),
            ttl_secs,
        })
    }

    /// Issue a token for a user, valid from now for the configured TTL
    pub fn issue(&self, user_id: UserId, email: &Email, role: UserRole) -> Result<String, TokenError> {
        self.issue_at(user_id, email, role, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: UserId,
        email: &Email,
        role: UserRole,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.as_str().to_string(),
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims on success
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::MalformedToken,
            })
    }
}

/// Extract the token from an `Authorization` header value
pub fn strip_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
