//! In-Memory Repository
//!
//! Process-local user store for tests and local runs without a database.

use chrono::Utc;
use kernel::id::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Users keyed by exact email
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<Email, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, HashMap<Email, User>>> {
        self.users
            .lock()
            .map_err(|_| AuthError::Internal("user store lock poisoned".to_string()))
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.lock()?.contains_key(email))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.lock()?.get(email).cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self
            .lock()?
            .values()
            .find(|user| user.user_id == *user_id)
            .cloned())
    }

    async fn save(&self, user: NewUser) -> AuthResult<User> {
        // Check and insert under one lock so concurrent saves cannot both win
        let mut users = self.lock()?;
        if users.contains_key(&user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let user = user.into_user(UserId::new(), Utc::now());
        users.insert(user.email.clone(), user.clone());

        Ok(user)
    }
}
