//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Cryptographic utilities (secure random bytes, Base64)
//! - Password hashing (Argon2id with per-hash random salt)

pub mod crypto;
pub mod password;
