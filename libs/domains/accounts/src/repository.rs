use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{AccountError, AccountResult};
use crate::models::{NewUser, User, UserId};

/// Repository trait for user persistence.
///
/// Lookups return `Ok(None)` on a miss so callers can tell "no such user"
/// apart from a storage failure.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by email (exact match)
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>>;

    /// Get a user by ID
    async fn find_by_id(&self, id: UserId) -> AccountResult<Option<User>>;

    /// Get the user currently holding `token` as their reset token
    async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<User>>;

    /// Persist a new user and assign its id. Fails with `Conflict` if the
    /// email is taken.
    async fn create(&self, user: NewUser) -> AccountResult<User>;

    /// Set (or overwrite) the pending reset token
    async fn update_reset_token(&self, id: UserId, token: &str) -> AccountResult<Option<User>>;

    /// Atomically: if some user holds `token`, replace their password hash
    /// and clear the token. Returns `None` when no user holds it.
    async fn update_password_and_clear_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> AccountResult<Option<User>>;

    /// Replace the password hash without touching the reset token
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> AccountResult<Option<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> AccountResult<User> {
        if new_user.password_hash.is_empty() {
            return Err(AccountError::EmptyInput);
        }

        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(AccountError::Conflict(new_user.email));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            reset_token: None,
            roles: new_user.roles,
            created_at: now,
            updated_at: now,
        };

        users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn update_reset_token(&self, id: UserId, token: &str) -> AccountResult<Option<User>> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            user.reset_token = Some(token.to_string());
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password_and_clear_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> AccountResult<Option<User>> {
        if password_hash.is_empty() {
            return Err(AccountError::EmptyInput);
        }

        let mut users = self.users.write().await;

        Ok(users
            .values_mut()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .map(|user| {
                user.password_hash = password_hash.to_string();
                user.reset_token = None;
                user.updated_at = Utc::now();
                user.clone()
            }))
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> AccountResult<Option<User>> {
        if password_hash.is_empty() {
            return Err(AccountError::EmptyInput);
        }

        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hashed_password".to_string(),
            roles: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("a@example.com")).await.unwrap();
        let second = repo.create(new_user("b@example.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.reset_token.is_none());

        let fetched = repo.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "a@example.com");
    }

    #[tokio::test]
    async fn test_roles_are_stored() {
        let repo = InMemoryUserRepository::new();
        let admin = Role {
            id: 1,
            name: "admin".to_string(),
        };

        let created = repo
            .create(NewUser {
                roles: vec![admin.clone()],
                ..new_user("admin@example.com")
            })
            .await
            .unwrap();

        assert_eq!(created.roles, vec![admin]);
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("test@example.com")).await.unwrap();

        assert!(repo.find_by_email("test@example.com").await.unwrap().is_some());
        assert!(repo.find_by_email("TEST@EXAMPLE.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("test@example.com")).await.unwrap();

        let result = repo.create(new_user("test@example.com")).await;
        assert!(matches!(result, Err(AccountError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_empty_hash_is_never_persisted() {
        let repo = InMemoryUserRepository::new();

        let result = repo
            .create(NewUser {
                password_hash: String::new(),
                ..new_user("test@example.com")
            })
            .await;

        assert!(matches!(result, Err(AccountError::EmptyInput)));
        assert!(repo.find_by_email("test@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_token_lifecycle() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("test@example.com")).await.unwrap();

        repo.update_reset_token(user.id, "tok-1").await.unwrap();
        repo.update_reset_token(user.id, "tok-2").await.unwrap();

        assert!(repo.find_by_reset_token("tok-1").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_reset_token("tok-2").await.unwrap().unwrap().id,
            user.id
        );

        let updated = repo
            .update_password_and_clear_token("tok-2", "new_hash")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "new_hash");
        assert!(updated.reset_token.is_none());

        assert!(
            repo.update_password_and_clear_token("tok-2", "other_hash")
                .await
                .unwrap()
                .is_none()
        );
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new_hash");
    }

    #[tokio::test]
    async fn test_updates_on_missing_user_return_none() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.update_reset_token(99, "tok").await.unwrap().is_none());
        assert!(repo.update_password_hash(99, "hash").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_token_consumption_applies_once() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("test@example.com")).await.unwrap();
        repo.update_reset_token(user.id, "shared").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.update_password_and_clear_token("shared", &format!("hash-{}", i))
                    .await
                    .unwrap()
                    .is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
