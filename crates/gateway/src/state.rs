use std::sync::Arc;

use sm_accounts::{AccountService, HistoryStore};
use sm_domain::config::Config;
use sm_providers::LlmProvider;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Upstream model client. `None` when no API key could be resolved;
    /// `/api/process` then fails every request.
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub accounts: Arc<AccountService>,
    pub history: Arc<dyn HistoryStore>,
}
