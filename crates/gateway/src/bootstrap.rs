//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use sm_accounts::{AccountService, HistoryStore, InMemoryHistoryStore, JsonUserStore, UserStore};
use sm_domain::config::{Config, ConfigSeverity, StoreBackend};
use sm_providers::LlmProvider;

use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── LLM provider ─────────────────────────────────────────────────
    let llm: Option<Arc<dyn LlmProvider>> = match sm_providers::build_provider(&config.llm) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "LLM provider not initialized; /api/process will fail until an API key is configured"
            );
            None
        }
    };

    // ── User store ───────────────────────────────────────────────────
    let users = build_user_store(&config).await?;
    tracing::info!(backend = users.backend(), "user store ready");

    let accounts = Arc::new(
        AccountService::new(users, config.accounts.bcrypt_cost)
            .context("initializing account service")?,
    );

    // ── History ──────────────────────────────────────────────────────
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());

    Ok(AppState {
        config,
        llm,
        accounts,
        history,
    })
}

async fn build_user_store(config: &Config) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.store.backend {
        StoreBackend::Json => {
            let store = JsonUserStore::new(&config.store.state_path).with_context(|| {
                format!(
                    "opening user store under {}",
                    config.store.state_path.display()
                )
            })?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "mongodb")]
        StoreBackend::Mongodb => {
            let store = sm_accounts::MongoUserStore::connect(&config.store.mongodb)
                .await
                .context("connecting to MongoDB user store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StoreBackend::Mongodb => {
            anyhow::bail!(
                "store.backend = \"mongodb\" requires building with `--features mongodb`"
            )
        }
    }
}
