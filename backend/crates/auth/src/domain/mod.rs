//! Domain Layer
//!
//! Entities, value objects, the request identity and the repository trait.

pub mod entity;
pub mod identity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::user::{NewUser, User};
pub use identity::RequestIdentity;
pub use repository::UserRepository;
pub use value_object::{email::Email, user_role::UserRole};
