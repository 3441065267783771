use async_trait::async_trait;

use super::{NewUser, User, UserChanges, UserRole};
use crate::shared::DomainResult;

/// Durable account storage.
///
/// Implementations must reject a second user with an existing username with
/// `DomainError::DuplicateUsername`, including when the two writes race.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, user: NewUser) -> DomainResult<User>;

    /// Users matching `role` (all users when `None`), ordered by creation time then id.
    async fn list_users(&self, role: Option<UserRole>) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<User>;
    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn count_users(&self) -> DomainResult<u64>;

    async fn update_user(&self, id: &str, changes: UserChanges) -> DomainResult<User>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;

    /// Cheap round-trip to the backing store, used by the health check.
    async fn ping(&self) -> DomainResult<()>;
}
