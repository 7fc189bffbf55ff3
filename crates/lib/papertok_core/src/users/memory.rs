//! In-process user store used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Result, UserStore, UserStoreError};
use crate::models::auth::{NewUser, UserRecord};

#[derive(Debug)]
struct Inner {
    users: HashMap<i64, UserRecord>,
    next_id: i64,
}

/// Map-backed [`UserStore`]. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Remove a user. Returns whether a record was removed.
    pub async fn delete(&self, id: i64) -> bool {
        self.inner.write().await.users.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }

    async fn find_by<F>(&self, pred: F) -> Result<UserRecord>
    where
        F: Fn(&UserRecord) -> bool,
    {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| pred(u))
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(UserStoreError::AlreadyExists);
        }

        let now = Utc::now();
        let id = inner.next_id;
        inner.next_id += 1;
        let record = UserRecord {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord> {
        self.find_by(|u| u.email == email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<UserRecord> {
        self.find_by(|u| u.username == username).await
    }

    async fn find_by_id(&self, id: i64) -> Result<UserRecord> {
        if id <= 0 {
            return Err(UserStoreError::InvalidId(id));
        }
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .any(|u| u.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .any(|u| u.username == username))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_monotonic_ids() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("alice", "a@example.com")).await.unwrap();
        let b = store.create(new_user("bob", "b@example.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("alice", "a@example.com")).await.unwrap();
        assert!(store.delete(a.id).await);
        let b = store.create(new_user("bob", "b@example.com")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice", "a@example.com")).await.unwrap();

        let err = store
            .create(new_user("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserStoreError::AlreadyExists));

        let err = store
            .create(new_user("alice2", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserStoreError::AlreadyExists));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn lookups_by_each_key() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("alice", "a@example.com")).await.unwrap();

        assert_eq!(store.find_by_email("a@example.com").await.unwrap().id, created.id);
        assert_eq!(store.find_by_username("alice").await.unwrap().id, created.id);
        assert_eq!(store.find_by_id(created.id).await.unwrap().email, "a@example.com");
        assert!(store.exists_by_email("a@example.com").await.unwrap());
        assert!(store.exists_by_username("alice").await.unwrap());
        assert!(!store.exists_by_username("bob").await.unwrap());
    }

    #[tokio::test]
    async fn missing_and_invalid_ids() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.find_by_id(42).await.unwrap_err(),
            UserStoreError::NotFound
        ));
        assert!(matches!(
            store.find_by_id(0).await.unwrap_err(),
            UserStoreError::InvalidId(0)
        ));
        assert!(matches!(
            store.find_by_email("nobody@example.com").await.unwrap_err(),
            UserStoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryUserStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create(new_user(&format!("user{i}"), &format!("u{i}@example.com")))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
    }
}
