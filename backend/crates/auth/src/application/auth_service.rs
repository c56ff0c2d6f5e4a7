//! Auth Service
//!
//! Sign-up and sign-in. The two share nothing but the final token issuance,
//! so each failure mode stays unambiguous.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::{ClearTextPassword, HashedPassword, PasswordHasher};

use crate::application::token::TokenService;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    /// Role name; `None` means [`UserRole::User`]
    pub user_role: Option<String>,
}

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Result of a successful sign-up or sign-in
#[derive(Debug, Clone)]
pub struct AuthOutput {
    /// Raw access token (without the `Bearer ` prefix)
    pub access_token: String,
    pub user_id: UserId,
    pub email: Email,
}

/// Orchestrates credential checks, persistence and token issuance
pub struct AuthService<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<PasswordHasher>, tokens: Arc<TokenService>) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }

    pub async fn sign_up(&self, input: SignUpInput) -> AuthResult<AuthOutput> {
        let email = Email::new(input.email)?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let user_role = match input.user_role.as_deref() {
            Some(name) => name.parse::<UserRole>()?,
            None => UserRole::default(),
        };

        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let password_hash = self.hash_password(password).await?;

        // A concurrent sign-up that won the race surfaces here as DuplicateEmail
        let user = self
            .repo
            .save(NewUser::new(email, password_hash, user_role))
            .await?;

        let output = self.issue(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            user_role = %user.user_role,
            "User signed up"
        );

        Ok(output)
    }

    pub async fn sign_in(&self, input: SignInInput) -> AuthResult<AuthOutput> {
        // An address that cannot be valid cannot belong to anyone
        let email = Email::new(input.email).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if self.hasher.needs_rehash(&user.password_hash) {
            tracing::info!(user_id = %user.user_id, "Stored password hash uses outdated cost parameters");
        }

        let output = self.issue(&user)?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(output)
    }

    fn issue(&self, user: &User) -> AuthResult<AuthOutput> {
        let access_token = self
            .tokens
            .issue(user.user_id, &user.email, user.user_role)?;

        Ok(AuthOutput {
            access_token,
            user_id: user.user_id,
            email: user.email.clone(),
        })
    }

    /// Argon2 is deliberately slow; keep it off the async workers.
    /// If the caller goes away the hash still completes and is dropped.
    async fn hash_password(&self, password: ClearTextPassword) -> AuthResult<HashedPassword> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify_password(
        &self,
        password: ClearTextPassword,
        hash: &HashedPassword,
    ) -> AuthResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let hash = hash.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }
}
