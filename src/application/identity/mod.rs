//! Identity module: user management & authentication
//!
//! Contains the `UserService` which orchestrates all user-related
//! use-cases: login, token refresh, registration, listing, updates.

pub mod commands;
pub mod service;

pub use commands::{RegisterUser, UpdateUser};
pub use service::{validate_password, AccessGrant, UserService};
