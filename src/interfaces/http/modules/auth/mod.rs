//! Auth module: login, token refresh and the caller's profile

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
