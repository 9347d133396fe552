//! Registration and login on top of a [`UserStore`].
//!
//! bcrypt is deliberately slow, so every hash and verify runs on the
//! blocking pool instead of an async worker thread.

use std::sync::Arc;

use sm_domain::error::{Error, Result};
use sm_domain::trace::TraceEvent;

use crate::users::{UserAccount, UserStore};

pub struct AccountService {
    store: Arc<dyn UserStore>,
    cost: u32,
    /// Verified against when the username is unknown, so both failure
    /// paths spend the same bcrypt work.
    dummy_hash: String,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, cost: u32) -> Result<Self> {
        let dummy_hash = bcrypt::hash("smash-unknown-user", cost)
            .map_err(|e| Error::Auth(format!("bcrypt: {e}")))?;
        Ok(Self {
            store,
            cost,
            dummy_hash,
        })
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Create an account. Fails with [`Error::DuplicateUsername`] when the
    /// name is taken and [`Error::MissingField`] when either input is empty.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() {
            return Err(Error::MissingField("username"));
        }
        if password.is_empty() {
            return Err(Error::MissingField("password"));
        }

        if self.store.find_by_username(username).await?.is_some() {
            return Err(Error::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_password(password.to_string(), self.cost).await?;
        // The store re-checks uniqueness; a concurrent register still loses.
        self.store
            .insert(UserAccount::new(username, password_hash))
            .await?;

        TraceEvent::UserRegistered {
            username: username.to_string(),
        }
        .emit();
        Ok(())
    }

    /// Check a username/password pair. Unknown users and wrong passwords
    /// both yield [`Error::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let account = self.store.find_by_username(username).await?;

        let (hash, known) = match &account {
            Some(a) => (a.password_hash.clone(), true),
            None => (self.dummy_hash.clone(), false),
        };
        let matched = verify_password(password.to_string(), hash).await?;
        let success = known && matched;

        TraceEvent::LoginAttempt {
            username: username.to_string(),
            success,
        }
        .emit();

        if success {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| Error::Other(format!("hash task: {e}")))?
        .map_err(|e| Error::Auth(format!("bcrypt: {e}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Other(format!("verify task: {e}")))?;
    match verified {
        Ok(ok) => Ok(ok),
        Err(e) => {
            // A malformed stored hash is treated as a mismatch.
            tracing::warn!(error = %e, "bcrypt verify failed");
            Ok(false)
        }
    }
}
