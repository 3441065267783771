//! User DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{RegisterUser, UpdateUser};
use crate::domain::{User, UserRole};

/// User API representation. The password hash never leaves the service.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    #[schema(value_type = String, example = "EMPLOYEE")]
    pub role: UserRole,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "jdoe")]
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Defaults to `EMPLOYEE`
    #[serde(default = "default_role")]
    #[schema(value_type = String, example = "EMPLOYEE")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Employee
}

impl From<CreateUserRequest> for RegisterUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            role: req.role,
        }
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[schema(value_type = Option<String>, example = "MANAGER")]
    pub role: Option<UserRole>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            role: req.role,
        }
    }
}
