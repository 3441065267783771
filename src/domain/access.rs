//! Access policy
//!
//! Every operation of the account API is listed in [`Operation`] together
//! with the [`Requirement`] a caller must meet. [`authorize`] is the only
//! place those requirements are evaluated.

use tracing::debug;

use crate::domain::user::UserRole;
use crate::shared::{DomainError, DomainResult};

/// Identity resolved from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

/// Account API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Refresh,
    Register,
    List,
    Profile,
    Retrieve,
    Update,
    Delete,
}

/// What a caller needs in order to run an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(UserRole),
}

impl Operation {
    pub fn requirement(self) -> Requirement {
        match self {
            Operation::Login | Operation::Refresh => Requirement::Public,
            Operation::List | Operation::Profile => Requirement::Authenticated,
            Operation::Register | Operation::Retrieve | Operation::Update | Operation::Delete => {
                Requirement::Role(UserRole::Admin)
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Refresh => "refresh",
            Operation::Register => "register",
            Operation::List => "list",
            Operation::Profile => "profile",
            Operation::Retrieve => "retrieve",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Check `caller` against the requirement of `operation`.
///
/// A missing caller fails with `Unauthenticated` for every non-public
/// operation; a caller with the wrong role fails with `PermissionDenied`.
pub fn authorize(caller: Option<&Caller>, operation: Operation) -> DomainResult<()> {
    match (operation.requirement(), caller) {
        (Requirement::Public, _) => Ok(()),
        (_, None) => Err(DomainError::Unauthenticated),
        (Requirement::Authenticated, Some(_)) => Ok(()),
        (Requirement::Role(required), Some(caller)) if caller.role == required => Ok(()),
        (Requirement::Role(required), Some(caller)) => {
            debug!(
                operation = operation.name(),
                caller = %caller.username,
                role = %caller.role,
                required = %required,
                "Permission denied"
            );
            Err(DomainError::PermissionDenied)
        }
    }
}

/// Rows of the user table visible to a caller through the List operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    OnlyRole(UserRole),
    Nothing,
}

impl ListScope {
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Admin => ListScope::All,
            UserRole::Manager => ListScope::OnlyRole(UserRole::Employee),
            UserRole::Employee => ListScope::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: UserRole) -> Caller {
        Caller {
            user_id: "u-1".into(),
            username: "someone".into(),
            role,
        }
    }

    const ADMIN_ONLY: [Operation; 4] = [
        Operation::Register,
        Operation::Retrieve,
        Operation::Update,
        Operation::Delete,
    ];

    #[test]
    fn admin_only_operations_reject_other_roles() {
        for op in ADMIN_ONLY {
            assert!(authorize(Some(&caller(UserRole::Admin)), op).is_ok());
            for role in [UserRole::Manager, UserRole::Employee] {
                assert!(
                    matches!(
                        authorize(Some(&caller(role)), op),
                        Err(DomainError::PermissionDenied)
                    ),
                    "{} must be denied to {}",
                    op.name(),
                    role
                );
            }
        }
    }

    #[test]
    fn anonymous_callers_only_reach_public_operations() {
        assert!(authorize(None, Operation::Login).is_ok());
        assert!(authorize(None, Operation::Refresh).is_ok());
        for op in [Operation::List, Operation::Profile, Operation::Register, Operation::Delete] {
            assert!(matches!(authorize(None, op), Err(DomainError::Unauthenticated)));
        }
    }

    #[test]
    fn list_and_profile_are_open_to_every_role() {
        for role in UserRole::ALL {
            assert!(authorize(Some(&caller(role)), Operation::List).is_ok());
            assert!(authorize(Some(&caller(role)), Operation::Profile).is_ok());
        }
    }

    #[test]
    fn list_scope_narrows_by_role() {
        assert_eq!(ListScope::for_role(UserRole::Admin), ListScope::All);
        assert_eq!(
            ListScope::for_role(UserRole::Manager),
            ListScope::OnlyRole(UserRole::Employee)
        );
        assert_eq!(ListScope::for_role(UserRole::Employee), ListScope::Nothing);
    }
}
