use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_3000")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Directory served for every path the API does not claim.
    #[serde(default = "d_static_dir")]
    pub static_dir: PathBuf,
    /// Where `GET /` redirects to.
    #[serde(default = "d_index_page")]
    pub index_page: String,
    /// Per-IP token-bucket rate limiting configuration.
    /// When `None` (the default), rate limiting is disabled.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_3000(),
            host: d_host(),
            cors: CorsConfig::default(),
            static_dir: d_static_dir(),
            index_page: d_index_page(),
            rate_limit: None,
        }
    }
}

/// Per-IP token-bucket rate limiting configuration.
///
/// `requests_per_second` controls the replenishment rate, while `burst_size`
/// sets the maximum number of requests a single IP can send in a quick burst
/// before being throttled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u64,
    pub burst_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Use `["*"]` for permissive (NOT recommended).
    /// Defaults to localhost-only.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_3000() -> u16 {
    3000
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_static_dir() -> PathBuf {
    PathBuf::from("public")
}
fn d_index_page() -> String {
    "/register.html".into()
}
fn d_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:*".into(),
        "http://127.0.0.1:*".into(),
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
