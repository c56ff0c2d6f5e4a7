//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use kernel::id::UserId;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Check if a user with this exact email exists
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Persist a new user and return it with its assigned ID
    ///
    /// Must be atomic with respect to email uniqueness: when another user
    /// already holds the email, fails with `AuthError::DuplicateEmail` and
    /// stores nothing.
    async fn save(&self, user: NewUser) -> AuthResult<User>;
}
