use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};

use crate::domain::{
    DomainError, DomainResult, NewUser, User, UserChanges, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::database::entities::user;
use crate::shared::InfraError;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Manager => UserRole::Manager,
        user::UserRole::Employee => UserRole::Employee,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Manager => user::UserRole::Manager,
        UserRole::Employee => user::UserRole::Employee,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: DbErr) -> DomainError {
    InfraError::Database(e).into()
}

/// Map a write failure, turning unique-index violations into `DuplicateUsername`.
fn write_err(e: DbErr, username: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::DuplicateUsername(username.to_string())
        }
        _ => db_err(e),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let username = new_user.username.clone();

        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            role: Set(domain_role_to_entity(new_user.role)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, &username))?;

        Ok(user_model_to_domain(inserted))
    }

    async fn list_users(&self, role: Option<UserRole>) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find();

        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }

        let models = query
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<User> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(user_model_to_domain)
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn count_users(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> DomainResult<User> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if changes.is_empty() {
            return Ok(user_model_to_domain(existing));
        }

        let username = changes
            .username
            .clone()
            .unwrap_or_else(|| existing.username.clone());
        let mut active: user::ActiveModel = existing.into();

        if let Some(new_username) = changes.username {
            active.username = Set(new_username);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(domain_role_to_entity(role));
        }
        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(updated) => Ok(user_model_to_domain(updated)),
            // Row vanished between the read and the write
            Err(DbErr::RecordNotUpdated) => Err(DomainError::user_not_found(id)),
            Err(e) => Err(write_err(e, &username)),
        }
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::user_not_found(id));
        }

        Ok(())
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
