//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;
mod dto_update;

pub use model::{validate_username, User, UserRole, USERNAME_MAX_LEN};

pub use dto_create::NewUser;
pub use dto_update::UserChanges;

pub use repository::UserRepositoryInterface;
