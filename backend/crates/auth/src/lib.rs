//! Auth (Authentication / Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Sign-up / sign-in and token issuance
//! - `infra/` - Repository implementations (PostgreSQL, in-memory)
//! - `presentation/` - HTTP handlers, DTOs, router, middleware, audit
//!
//! ## Features
//! - User sign-up / sign-in with email + password
//! - Stateless HS256 bearer tokens carrying user ID and role
//! - Role-based gate for admin path prefixes with an audit trail
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Sign-in failures are indistinguishable to the client
//! - Any token failure is a uniform 401; insufficient role is a 403

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::identity::RequestIdentity;
pub use error::{AuthError, AuthResult, TokenError};
pub use infra::{InMemoryUserRepository, PgUserRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod audit {
    pub use crate::presentation::audit::*;
}
