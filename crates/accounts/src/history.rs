//! Per-user request history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use sm_domain::action::Action;
use sm_domain::error::Result;

/// One successful `/api/process` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub code: String,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(code: impl Into<String>, action: Action) -> Self {
        Self {
            code: code.into(),
            action,
            timestamp: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append an entry; returns the user's entry count afterwards.
    async fn append(&self, username: &str, entry: HistoryEntry) -> Result<usize>;

    /// All entries for `username` in insertion order. Unknown users get `[]`.
    async fn list(&self, username: &str) -> Result<Vec<HistoryEntry>>;
}

/// Process-lifetime history. Nothing is persisted or pruned.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<HashMap<String, Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, username: &str, entry: HistoryEntry) -> Result<usize> {
        let mut map = self.entries.write();
        let list = map.entry(username.to_string()).or_default();
        list.push(entry);
        Ok(list.len())
    }

    async fn list(&self, username: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .entries
            .read()
            .get(username)
            .cloned()
            .unwrap_or_default())
    }
}
