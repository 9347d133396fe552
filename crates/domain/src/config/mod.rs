mod llm;
mod observability;
mod prompt;
mod server;
mod store;

pub use llm::*;
pub use observability::*;
pub use prompt::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Apply process-environment overrides on top of the file config.
    ///
    /// - `PORT` → `server.port` (ignored when not a valid port)
    /// - `MONGODB_URI` → `store.mongodb.uri`
    ///
    /// `lookup` is injected so tests do not have to mutate the real env.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid PORT override"),
            }
        }
        if let Some(uri) = lookup("MONGODB_URI").filter(|u| !u.trim().is_empty()) {
            self.store.mongodb.uri = uri;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            });
        };

        if self.server.port == 0 {
            push(ConfigSeverity::Error, "server.port", "port must be greater than 0");
        }
        if self.server.host.is_empty() {
            push(ConfigSeverity::Error, "server.host", "host must not be empty");
        }
        if !self.server.index_page.starts_with('/') {
            push(
                ConfigSeverity::Error,
                "server.index_page",
                "index page must be an absolute path starting with '/'",
            );
        }
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            push(
                ConfigSeverity::Warning,
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            );
        }

        if self.llm.base_url.is_empty() {
            push(ConfigSeverity::Error, "llm.base_url", "base_url must not be empty");
        }
        if self.llm.model.is_empty() {
            push(ConfigSeverity::Error, "llm.model", "model must not be empty");
        }
        if self.llm.stream_timeout_secs == 0 {
            push(
                ConfigSeverity::Error,
                "llm.stream_timeout_secs",
                "stream timeout must be greater than 0",
            );
        }
        if self.llm.auth.key.is_none() && self.llm.auth.env.is_none() {
            push(
                ConfigSeverity::Warning,
                "llm.auth",
                "no API key source configured; /api/process will fail",
            );
        }

        if self.accounts.bcrypt_cost < MIN_BCRYPT_COST {
            push(
                ConfigSeverity::Error,
                "accounts.bcrypt_cost",
                "bcrypt cost must be at least 10",
            );
        } else if self.accounts.bcrypt_cost > 31 {
            push(
                ConfigSeverity::Error,
                "accounts.bcrypt_cost",
                "bcrypt cost must be at most 31",
            );
        }

        if self.store.backend == StoreBackend::Mongodb && self.store.mongodb.uri.is_empty() {
            push(
                ConfigSeverity::Error,
                "store.mongodb.uri",
                "uri must not be empty when backend = \"mongodb\"",
            );
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            push(
                ConfigSeverity::Error,
                "observability.sample_rate",
                "sample rate must be between 0.0 and 1.0",
            );
        }

        errors
    }
}
