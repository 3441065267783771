//! # ERP Access Service
//!
//! User accounts, roles and bearer-token authentication for the ERP backend.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: User model, roles, access policy and the repository trait
//! - **application**: `UserService`, the use cases behind every endpoint
//! - **infrastructure**: SeaORM persistence, in-memory store, JWT and bcrypt
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process lifecycle (migrations, admin bootstrap, shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryUserRepository};

// Re-export API router
pub use interfaces::http::create_api_router;
