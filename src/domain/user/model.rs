use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, DomainResult};

/// Longest accepted username, in characters.
pub const USERNAME_MAX_LEN: usize = 150;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Manager, UserRole::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "MANAGER" => Ok(UserRole::Manager),
            "EMPLOYEE" => Ok(UserRole::Employee),
            other => Err(DomainError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usernames are 1-150 characters of letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> DomainResult<()> {
    let len = username.chars().count();
    if len == 0 || len > USERNAME_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Username must be 1-{} characters",
            USERNAME_MAX_LEN
        )));
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
    {
        return Err(DomainError::Validation(format!(
            "Username may not contain '{}'",
            c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(" Manager ".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert_eq!("EMPLOYEE".parse::<UserRole>().unwrap(), UserRole::Employee);
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn role_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&UserRole::Manager).unwrap(), "\"MANAGER\"");
        let role: UserRole = serde_json::from_str("\"EMPLOYEE\"").unwrap();
        assert_eq!(role, UserRole::Employee);
        assert!(serde_json::from_str::<UserRole>("\"OWNER\"").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("jane.doe+ops@corp").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN)).is_ok());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }
}
