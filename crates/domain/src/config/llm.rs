use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Upstream chat-completion API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The single OpenAI-compatible endpoint every prompt is sent to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Identifier used in logs and error messages.
    #[serde(default = "d_id")]
    pub id: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// TCP/TLS connect timeout for the upstream client.
    #[serde(default = "d_30")]
    pub connect_timeout_secs: u64,
    /// Upper bound on one request's streaming + aggregation.
    #[serde(default = "d_300")]
    pub stream_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            id: d_id(),
            base_url: d_base_url(),
            model: d_model(),
            auth: AuthConfig::default(),
            temperature: None,
            max_tokens: None,
            connect_timeout_secs: d_30(),
            stream_timeout_secs: d_300(),
        }
    }
}

/// How the API key is obtained and presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header name. Defaults to `Authorization`.
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix. Defaults to `Bearer `.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Plaintext key (discouraged; prefer `env`).
    #[serde(default)]
    pub key: Option<String>,
    /// Environment variable holding the key.
    #[serde(default = "d_key_env")]
    pub env: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header: None,
            prefix: None,
            key: None,
            env: d_key_env(),
        }
    }
}

fn d_id() -> String {
    "deepseek".into()
}
fn d_base_url() -> String {
    "https://api.deepseek.com".into()
}
fn d_model() -> String {
    "deepseek-reasoner".into()
}
fn d_key_env() -> Option<String> {
    Some("DEEPSEEK_API_KEY".into())
}
fn d_30() -> u64 {
    30
}
fn d_300() -> u64 {
    300
}
