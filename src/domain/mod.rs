//! Domain layer: the user aggregate and the access policy.

pub mod access;
pub mod user;

pub use access::{authorize, Caller, ListScope, Operation, Requirement};
pub use user::{
    validate_username, NewUser, User, UserChanges, UserRepositoryInterface, UserRole,
};

pub use crate::shared::{DomainError, DomainResult};
