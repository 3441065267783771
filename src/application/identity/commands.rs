//! Inputs of the mutating identity use-cases.
//!
//! Passwords arrive in plaintext here and leave the service only as a hash.

use crate::domain::UserRole;

#[derive(Clone)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}
