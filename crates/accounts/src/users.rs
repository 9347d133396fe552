//! User account storage.
//!
//! [`JsonUserStore`] keeps every account in memory and writes the whole
//! set to `users.json` after each insert (temp file + rename), so a crash
//! never leaves a half-written file behind. The file write runs on the
//! blocking pool; inserts are serialized so snapshots land in order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use sm_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Account entity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A registered user. Only the bcrypt hash of the password is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(username: impl Into<String>, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CRUD contract for account persistence. Usernames are unique.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;

    /// Insert a new account.
    ///
    /// Fails with [`Error::DuplicateUsername`] when the username is taken,
    /// even if a concurrent insert won the race after the caller's lookup.
    async fn insert(&self, account: UserAccount) -> Result<()>;

    /// Short backend name for logs and diagnostics.
    fn backend(&self) -> &'static str;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON-file store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct JsonUserStore {
    users_path: PathBuf,
    users: RwLock<HashMap<String, UserAccount>>,
    /// Held across the snapshot write so flushes cannot reorder.
    flush_lock: tokio::sync::Mutex<()>,
}

impl JsonUserStore {
    /// Load or create the store at `state_path/users/users.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("users");
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;

        let users_path = dir.join("users.json");
        let users: HashMap<String, UserAccount> = if users_path.exists() {
            let raw = std::fs::read_to_string(&users_path).map_err(Error::Io)?;
            serde_json::from_str(&raw).map_err(|e| {
                Error::Persistence(format!("parsing {}: {e}", users_path.display()))
            })?
        } else {
            HashMap::new()
        };

        tracing::info!(
            users = users.len(),
            path = %users_path.display(),
            "user store loaded"
        );

        Ok(Self {
            users_path,
            users: RwLock::new(users),
            flush_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write `json` to `path` via a sibling temp file and rename.
async fn write_atomic(path: PathBuf, json: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)
    })
    .await
    .map_err(|e| Error::Other(format!("user store flush task: {e}")))?
    .map_err(Error::Io)
}

#[async_trait::async_trait]
impl UserStore for JsonUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self.users.read().get(username).cloned())
    }

    async fn insert(&self, account: UserAccount) -> Result<()> {
        let _flush = self.flush_lock.lock().await;
        let username = account.username.clone();

        let snapshot = {
            let mut users = self.users.write();
            if users.contains_key(&username) {
                return Err(Error::DuplicateUsername(username));
            }
            users.insert(username.clone(), account);
            match serde_json::to_string_pretty(&*users) {
                Ok(json) => json,
                Err(e) => {
                    users.remove(&username);
                    return Err(Error::Persistence(format!("serializing users: {e}")));
                }
            }
        };

        if let Err(e) = write_atomic(self.users_path.clone(), snapshot).await {
            // Keep memory and disk in agreement.
            self.users.write().remove(&username);
            tracing::error!(username = %username, error = %e, "user store flush failed");
            return Err(e);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::new(dir.path()).unwrap();

        store
            .insert(UserAccount::new("alice", "$2b$04$hash".into()))
            .await
            .unwrap();

        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "$2b$04$hash");
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::new(dir.path()).unwrap();

        store
            .insert(UserAccount::new("alice", "h1".into()))
            .await
            .unwrap();
        let err = store
            .insert(UserAccount::new("alice", "h2".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateUsername(ref u) if u == "alice"));
        assert_eq!(store.len(), 1);
        let kept = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept.password_hash, "h1");
    }

    #[tokio::test]
    async fn accounts_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonUserStore::new(dir.path()).unwrap();
            store
                .insert(UserAccount::new("carol", "h".into()))
                .await
                .unwrap();
        }

        let reopened = JsonUserStore::new(dir.path()).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.find_by_username("carol").await.unwrap().is_some());
        assert!(!dir.path().join("users/users.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_flush_rolls_back_insert() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::new(dir.path()).unwrap();
        std::fs::remove_dir_all(dir.path().join("users")).unwrap();

        let err = store
            .insert(UserAccount::new("dave", "h".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(store.is_empty());
        assert!(store.find_by_username("dave").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_inserts_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonUserStore::new(dir.path()).unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(UserAccount::new(format!("user-{i}"), "h".into()))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let reopened = JsonUserStore::new(dir.path()).unwrap();
        assert_eq!(reopened.len(), 16);
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users/users.json"), "{not json").unwrap();

        let err = JsonUserStore::new(dir.path()).err().unwrap();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
