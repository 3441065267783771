//! User management service: application-layer orchestration
//!
//! All user-related business logic lives here. HTTP handlers are thin
//! wrappers that resolve the caller and delegate to this service. Every
//! operation passes through [`authorize`] before it touches the repository.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::commands::{RegisterUser, UpdateUser};
use crate::domain::{
    authorize, validate_username, Caller, DomainError, DomainResult, ListScope, NewUser,
    Operation, User, UserChanges, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::{
    create_token, issue_token_pair, verify_token, JwtConfig, TokenPair, TokenType,
};
use crate::infrastructure::crypto::password::{hash_password, verify_password, DEFAULT_COST};
use crate::shared::InfraError;

pub const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt ignores everything past 72 bytes
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Fresh access token returned by the refresh flow.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: String,
    pub expires_in: i64,
}

/// Orchestrates the identity use-cases behind every endpoint.
pub struct UserService {
    repo: Arc<dyn UserRepositoryInterface>,
    jwt_config: JwtConfig,
    hash_cost: u32,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepositoryInterface>, jwt_config: JwtConfig) -> Self {
        Self {
            repo,
            jwt_config,
            hash_cost: DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (4..=31).
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Resolve the caller behind an access token.
    ///
    /// The token only names the account; role and username come from the
    /// store, so a demoted or deleted user loses access immediately.
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<Caller> {
        let claims = verify_token(access_token, TokenType::Access, &self.jwt_config).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            DomainError::Unauthenticated
        })?;

        match self.repo.get_user_by_id(&claims.sub).await {
            Ok(user) => Ok(Caller {
                user_id: user.id,
                username: user.username,
                role: user.role,
            }),
            Err(DomainError::NotFound { .. }) => {
                debug!(user_id = %claims.sub, "Access token for a missing account");
                Err(DomainError::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }

    /// Verify credentials and issue an access + refresh token pair.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<TokenPair> {
        authorize(None, Operation::Login)?;

        let Some(user) = self.repo.get_user_by_username(username).await? else {
            warn!(username, "Login failed: unknown username");
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(DomainError::InvalidCredentials);
        };

        let valid = verify_password(password, &user.password_hash).map_err(InfraError::from)?;
        if !valid {
            warn!(username, "Login failed: wrong password");
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            return Err(DomainError::InvalidCredentials);
        }

        let pair = issue_token_pair(&user, &self.jwt_config).map_err(InfraError::from)?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, username = %user.username, role = %user.role, "User logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The user is re-read so the new token carries the current role and a
    /// deleted account can no longer refresh.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AccessGrant> {
        authorize(None, Operation::Refresh)?;

        let claims = verify_token(refresh_token, TokenType::Refresh, &self.jwt_config)
            .map_err(|e| {
                debug!(error = %e, "Rejected refresh token");
                DomainError::Unauthenticated
            })?;

        let user = match self.repo.get_user_by_id(&claims.sub).await {
            Ok(user) => user,
            Err(DomainError::NotFound { .. }) => return Err(DomainError::Unauthenticated),
            Err(e) => return Err(e),
        };

        let access_token =
            create_token(&user, TokenType::Access, &self.jwt_config).map_err(InfraError::from)?;

        debug!(user_id = %user.id, "Access token refreshed");
        Ok(AccessGrant {
            access_token,
            expires_in: self.jwt_config.access_expires_in(),
        })
    }

    // ── Registration ────────────────────────────────────────────

    pub async fn register(&self, caller: &Caller, input: RegisterUser) -> DomainResult<User> {
        authorize(Some(caller), Operation::Register)?;

        validate_username(&input.username)?;
        validate_password(&input.password)?;

        let password_hash =
            hash_password(&input.password, self.hash_cost).map_err(InfraError::from)?;

        let user = self
            .repo
            .create_user(NewUser {
                username: input.username,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(
            actor = %caller.username,
            user_id = %user.id,
            username = %user.username,
            role = %user.role,
            "New user registered"
        );
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Users visible to the caller: everyone for admins, employees for
    /// managers, nobody for employees.
    pub async fn list_users(&self, caller: &Caller) -> DomainResult<Vec<User>> {
        authorize(Some(caller), Operation::List)?;

        match ListScope::for_role(caller.role) {
            ListScope::All => self.repo.list_users(None).await,
            ListScope::OnlyRole(role) => self.repo.list_users(Some(role)).await,
            ListScope::Nothing => Ok(Vec::new()),
        }
    }

    /// The caller's own record.
    pub async fn profile(&self, caller: &Caller) -> DomainResult<User> {
        authorize(Some(caller), Operation::Profile)?;
        self.repo.get_user_by_id(&caller.user_id).await
    }

    pub async fn get_user(&self, caller: &Caller, id: &str) -> DomainResult<User> {
        authorize(Some(caller), Operation::Retrieve)?;
        self.repo.get_user_by_id(id).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    pub async fn update_user(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateUser,
    ) -> DomainResult<User> {
        authorize(Some(caller), Operation::Update)?;

        if let Some(ref username) = input.username {
            validate_username(username)?;
        }
        let password_hash = match input.password {
            Some(ref password) => {
                validate_password(password)?;
                Some(hash_password(password, self.hash_cost).map_err(InfraError::from)?)
            }
            None => None,
        };

        let changes = UserChanges {
            username: input.username,
            password_hash,
            role: input.role,
        };
        let password_changed = changes.password_hash.is_some();

        let user = self.repo.update_user(id, changes).await?;

        info!(
            actor = %caller.username,
            user_id = %user.id,
            role = %user.role,
            password_changed,
            "User updated"
        );
        Ok(user)
    }

    pub async fn delete_user(&self, caller: &Caller, id: &str) -> DomainResult<()> {
        authorize(Some(caller), Operation::Delete)?;

        self.repo.delete_user(id).await?;

        info!(actor = %caller.username, user_id = id, "User deleted");
        Ok(())
    }

    // ── Maintenance ─────────────────────────────────────────────

    /// Create an admin account when the store is empty. Returns the new
    /// admin, or `None` when users already exist.
    pub async fn ensure_default_admin(
        &self,
        username: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        if self.repo.count_users().await? > 0 {
            return Ok(None);
        }

        validate_username(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password, self.hash_cost).map_err(InfraError::from)?;

        let admin = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = %admin.id, username = %admin.username, "Default admin created");
        Ok(Some(admin))
    }

    pub async fn check_store(&self) -> DomainResult<()> {
        self.repo.ping().await
    }
}

// ── Helpers ─────────────────────────────────────────────────────

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(DomainError::Validation(format!(
            "Password must be at most {} bytes",
            PASSWORD_MAX_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryUserRepository;

    const PASSWORD: &str = "correct-horse";

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let jwt = JwtConfig {
            secret: "service-test-secret".into(),
            access_expiration_minutes: 15,
            refresh_expiration_hours: 24,
            issuer: "erp-access-test".into(),
        };
        (UserService::new(repo.clone(), jwt).with_hash_cost(4), repo)
    }

    async fn seed(repo: &InMemoryUserRepository, username: &str, role: UserRole) -> Caller {
        let user = repo
            .create_user(NewUser {
                username: username.into(),
                password_hash: hash_password(PASSWORD, 4).unwrap(),
                role,
            })
            .await
            .unwrap();
        Caller {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }

    fn registration(username: &str, role: UserRole) -> RegisterUser {
        RegisterUser {
            username: username.into(),
            password: PASSWORD.into(),
            role,
        }
    }

    #[tokio::test]
    async fn login_issues_tokens_that_authenticate() {
        let (svc, repo) = service();
        let caller = seed(&repo, "admin", UserRole::Admin).await;

        let pair = svc.login("admin", PASSWORD).await.unwrap();
        assert_eq!(pair.expires_in, 900);

        let resolved = svc.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(resolved, caller);
        assert!(matches!(
            svc.authenticate(&pair.refresh_token).await,
            Err(DomainError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_user() {
        let (svc, repo) = service();
        seed(&repo, "admin", UserRole::Admin).await;

        assert!(matches!(
            svc.login("admin", "not-the-password").await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("ghost", PASSWORD).await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn non_admins_cannot_mutate_and_store_is_untouched() {
        let (svc, repo) = service();
        let target = seed(&repo, "target", UserRole::Employee).await;

        for role in [UserRole::Manager, UserRole::Employee] {
            let caller = seed(&repo, &format!("caller-{}", role.as_str()), role).await;
            let before = repo.count_users().await.unwrap();

            assert!(matches!(
                svc.register(&caller, registration("intruder", UserRole::Admin)).await,
                Err(DomainError::PermissionDenied)
            ));
            assert!(matches!(
                svc.update_user(
                    &caller,
                    &target.user_id,
                    UpdateUser {
                        role: Some(UserRole::Admin),
                        ..Default::default()
                    }
                )
                .await,
                Err(DomainError::PermissionDenied)
            ));
            assert!(matches!(
                svc.delete_user(&caller, &target.user_id).await,
                Err(DomainError::PermissionDenied)
            ));

            assert_eq!(repo.count_users().await.unwrap(), before);
            assert!(repo.get_user_by_username("intruder").await.unwrap().is_none());
            let unchanged = repo.get_user_by_id(&target.user_id).await.unwrap();
            assert_eq!(unchanged.role, UserRole::Employee);
        }
    }

    #[tokio::test]
    async fn list_is_scoped_by_caller_role() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;
        let manager = seed(&repo, "manager", UserRole::Manager).await;
        let employee = seed(&repo, "e1", UserRole::Employee).await;
        seed(&repo, "e2", UserRole::Employee).await;

        assert_eq!(svc.list_users(&admin).await.unwrap().len(), 4);

        let seen_by_manager = svc.list_users(&manager).await.unwrap();
        let mut names: Vec<_> = seen_by_manager.iter().map(|u| u.username.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["e1", "e2"]);

        assert!(svc.list_users(&employee).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_then_profile_round_trips() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;

        let created = svc
            .register(&admin, registration("newhire", UserRole::Manager))
            .await
            .unwrap();
        assert_ne!(created.password_hash, PASSWORD);

        let pair = svc.login("newhire", PASSWORD).await.unwrap();
        let me = svc.authenticate(&pair.access_token).await.unwrap();
        let profile = svc.profile(&me).await.unwrap();

        assert_eq!(profile.id, created.id);
        assert_eq!(profile.username, "newhire");
        assert_eq!(profile.role, UserRole::Manager);
    }

    #[tokio::test]
    async fn profile_is_always_the_callers_own_record() {
        let (svc, repo) = service();
        seed(&repo, "admin", UserRole::Admin).await;
        let employee = seed(&repo, "worker", UserRole::Employee).await;

        let profile = svc.profile(&employee).await.unwrap();
        assert_eq!(profile.id, employee.user_id);
        assert_eq!(profile.username, "worker");
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;

        svc.register(&admin, registration("dup", UserRole::Employee))
            .await
            .unwrap();
        assert!(matches!(
            svc.register(&admin, registration("dup", UserRole::Manager)).await,
            Err(DomainError::DuplicateUsername(_))
        ));
        assert_eq!(repo.list_users(None).await.unwrap().iter().filter(|u| u.username == "dup").count(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_registration_leaves_one_user() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;
        let svc = Arc::new(svc);

        let a = {
            let (svc, admin) = (svc.clone(), admin.clone());
            tokio::spawn(async move { svc.register(&admin, registration("same", UserRole::Employee)).await })
        };
        let b = {
            let (svc, admin) = (svc.clone(), admin.clone());
            tokio::spawn(async move { svc.register(&admin, registration("same", UserRole::Employee)).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::DuplicateUsername(_)))));
        assert_eq!(repo.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn deleted_user_disappears_everywhere() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;
        let victim = seed(&repo, "leaver", UserRole::Employee).await;

        svc.delete_user(&admin, &victim.user_id).await.unwrap();

        assert!(matches!(
            svc.profile(&victim).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            svc.update_user(&admin, &victim.user_id, UpdateUser::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            svc.delete_user(&admin, &victim.user_id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(svc
            .list_users(&admin)
            .await
            .unwrap()
            .iter()
            .all(|u| u.id != victim.user_id));
    }

    #[tokio::test]
    async fn update_changes_role_and_password() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;
        let worker = seed(&repo, "worker", UserRole::Employee).await;

        let updated = svc
            .update_user(
                &admin,
                &worker.user_id,
                UpdateUser {
                    password: Some("brand-new-secret".into()),
                    role: Some(UserRole::Manager),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Manager);

        assert!(svc.login("worker", "brand-new-secret").await.is_ok());
        assert!(matches!(
            svc.login("worker", PASSWORD).await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;

        let short = RegisterUser {
            password: "short".into(),
            ..registration("someone", UserRole::Employee)
        };
        assert!(matches!(
            svc.register(&admin, short).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.register(&admin, registration("bad name", UserRole::Employee)).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn refresh_reflects_current_role_and_rejects_deleted_users() {
        let (svc, repo) = service();
        let admin = seed(&repo, "admin", UserRole::Admin).await;
        let worker = seed(&repo, "worker", UserRole::Employee).await;
        let pair = svc.login("worker", PASSWORD).await.unwrap();

        svc.update_user(
            &admin,
            &worker.user_id,
            UpdateUser {
                role: Some(UserRole::Manager),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let grant = svc.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(svc.authenticate(&grant.access_token).await.unwrap().role, UserRole::Manager);

        assert!(matches!(
            svc.refresh(&pair.access_token).await,
            Err(DomainError::Unauthenticated)
        ));

        svc.delete_user(&admin, &worker.user_id).await.unwrap();
        assert!(matches!(
            svc.refresh(&pair.refresh_token).await,
            Err(DomainError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn default_admin_only_created_on_empty_store() {
        let (svc, repo) = service();

        let admin = svc
            .ensure_default_admin("admin", "admin12345")
            .await
            .unwrap()
            .expect("empty store gets an admin");
        assert_eq!(admin.role, UserRole::Admin);

        assert!(svc
            .ensure_default_admin("admin2", "admin12345")
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn authenticate_reads_the_current_account() {
        let (svc, repo) = service();
        let root = seed(&repo, "root", UserRole::Admin).await;
        let second = seed(&repo, "second", UserRole::Admin).await;
        let token = svc.login("second", PASSWORD).await.unwrap().access_token;

        svc.update_user(
            &root,
            &second.user_id,
            UpdateUser {
                role: Some(UserRole::Employee),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(svc.authenticate(&token).await.unwrap().role, UserRole::Employee);

        svc.delete_user(&root, &second.user_id).await.unwrap();
        assert!(matches!(
            svc.authenticate(&token).await,
            Err(DomainError::Unauthenticated)
        ));
    }
}
