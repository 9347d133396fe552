use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// User store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory for file-backed state (`users/users.json`).
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    #[serde(default)]
    pub mongodb: MongoConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            state_path: d_state_path(),
            mongodb: MongoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Json,
    /// Requires the `mongodb` cargo feature.
    Mongodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection URI. Overridden by the `MONGODB_URI` env var.
    #[serde(default = "d_mongo_uri")]
    pub uri: String,
    #[serde(default = "d_database")]
    pub database: String,
    #[serde(default = "d_collection")]
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: d_mongo_uri(),
            database: d_database(),
            collection: d_collection(),
        }
    }
}

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_mongo_uri() -> String {
    "mongodb://localhost:27017/smash".into()
}
fn d_database() -> String {
    "smash".into()
}
fn d_collection() -> String {
    "users".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Accounts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Smallest bcrypt cost accepted by config validation.
pub const MIN_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// bcrypt work factor (log2 rounds).
    #[serde(default = "d_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: d_bcrypt_cost(),
        }
    }
}

fn d_bcrypt_cost() -> u32 {
    MIN_BCRYPT_COST
}
