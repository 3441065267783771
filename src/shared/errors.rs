use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    #[error("No account found with the given credentials")]
    InvalidCredentials,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Validation: {0}")]
    Validation(String),

    /// The payload is only for logs; the message shown to callers is generic.
    #[error("Internal server error")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_found(id: &str) -> Self {
        DomainError::NotFound {
            entity: "User",
            field: "id",
            value: id.to_string(),
        }
    }

    /// Stable machine-readable identifier of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::InvalidCredentials => "invalid_credentials",
            DomainError::PermissionDenied => "permission_denied",
            DomainError::NotFound { .. } => "not_found",
            DomainError::DuplicateUsername(_) => "duplicate_username",
            DomainError::Validation(_) => "validation",
            DomainError::Internal(_) => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        error!(error = %e, "Infrastructure failure");
        DomainError::Internal(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
