//! User Entity
//!
//! A registered account. Created once at sign-up; email and role are never
//! changed by this crate.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_role::UserRole};

/// User entity as stored by a [`UserRepository`](crate::domain::UserRepository)
///
/// The password hash is here for verification only. It is never logged
/// (its `Debug` is redacted), never serialized and never put in a token.
#[derive(Debug, Clone)]
pub struct User {
    /// Assigned by the repository on save
    pub user_id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub user_role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: HashedPassword,
    pub user_role: UserRole,
}

impl NewUser {
    pub fn new(email: Email, password_hash: HashedPassword, user_role: UserRole) -> Self {
        Self {
            email,
            password_hash,
            user_role,
        }
    }

    /// Materialize with a repository-assigned id
    pub fn into_user(self, user_id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            user_id,
            email: self.email,
            password_hash: self.password_hash,
            user_role: self.user_role,
            created_at,
        }
    }
}
