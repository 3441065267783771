//! In-memory storage implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    DomainError, DomainResult, NewUser, User, UserChanges, UserRepositoryInterface, UserRole,
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    /// username -> id
    usernames: HashMap<String, String>,
}

/// In-memory user storage for development and testing.
///
/// Both indexes sit behind one lock, so a write is either fully visible or
/// not at all and concurrent registrations of one username cannot both win.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let mut tables = self.tables.write().await;
        if tables.usernames.contains_key(&new_user.username) {
            return Err(DomainError::DuplicateUsername(new_user.username));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };

        tables
            .usernames
            .insert(user.username.clone(), user.id.clone());
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn list_users(&self, role: Option<UserRole>) -> DomainResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> DomainResult<User> {
        let mut tables = self.tables.write().await;
        let Tables { users, usernames } = &mut *tables;

        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if changes.is_empty() {
            return Ok(user.clone());
        }

        if let Some(new_username) = changes.username {
            if new_username != user.username {
                if usernames.contains_key(&new_username) {
                    return Err(DomainError::DuplicateUsername(new_username));
                }
                usernames.remove(&user.username);
                usernames.insert(new_username.clone(), user.id.clone());
                user.username = new_username;
            }
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .remove(id)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        tables.usernames.remove(&user.username);
        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
