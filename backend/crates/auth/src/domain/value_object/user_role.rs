use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

/// Closed set of account roles
///
/// Adding a role means every `match` on it stops compiling until the new
/// role has been given a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "USER",
            Admin => "ADMIN",
        }
    }

    /// Access to privileged (admin) routes
    #[inline]
    pub const fn is_admin(&self) -> bool {
        use UserRole::*;
        match self {
            Admin => true,
            User => false,
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(User),
            1 => Some(Admin),
            _ => None,
        }
    }
}

impl FromStr for UserRole {
    type Err = AuthError;

    /// Case-insensitive: `"USER"`, `"user"` and `"User"` all parse.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        [UserRole::User, UserRole::Admin]
            .into_iter()
            .find(|role| role.code().eq_ignore_ascii_case(name))
            .ok_or_else(|| AuthError::InvalidRole(name.to_string()))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
