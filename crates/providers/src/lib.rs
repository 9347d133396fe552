pub mod openai_compat;
pub mod traits;
pub mod util;
pub(crate) mod sse;

use std::sync::Arc;

use sm_domain::config::LlmConfig;
use sm_domain::error::Result;

// Re-exports for convenience.
pub use openai_compat::OpenAiCompatProvider;
pub use traits::{ChatRequest, LlmProvider};

/// Build the configured upstream provider.
///
/// Fails when the API key cannot be resolved; callers decide whether that
/// aborts startup.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider = OpenAiCompatProvider::from_config(config)?;
    tracing::info!(
        provider_id = %config.id,
        base_url = %config.base_url,
        model = %config.model,
        "registered LLM provider"
    );
    Ok(Arc::new(provider))
}
