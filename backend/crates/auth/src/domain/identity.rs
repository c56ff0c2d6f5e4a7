//! Request Identity
//!
//! Who is making the current request, as established by the bearer-token
//! stage. Lives in the request's extensions for exactly one request.

use kernel::id::UserId;

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIdentity {
    pub user_id: UserId,
    pub role: UserRole,
}

impl RequestIdentity {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}
