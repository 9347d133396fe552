//! Shared helpers for provider adapters.

use sm_domain::config::AuthConfig;
use sm_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API key from an [`AuthConfig`].
///
/// A plaintext `key` wins (with a warning); otherwise the `env` variable
/// is read. Empty values count as unset.
pub fn resolve_api_key(auth: &AuthConfig) -> Result<String> {
    resolve_api_key_with(auth, |name| std::env::var(name).ok())
}

/// [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with<F>(auth: &AuthConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = auth.key.as_ref().filter(|k| !k.is_empty()) {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; prefer 'env' instead"
        );
        return Ok(key.clone());
    }

    if let Some(env_var) = &auth.env {
        return lookup(env_var)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                Error::Auth(format!("environment variable '{env_var}' not set or empty"))
            });
    }

    Err(Error::Auth(
        "no API key configured: set 'key' or 'env' in [llm.auth]".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn plaintext_key_wins() {
        let auth = AuthConfig {
            key: Some("sk-test-123".into()),
            ..Default::default()
        };
        let key = resolve_api_key_with(&auth, |_| Some("from-env".into())).unwrap();
        assert_eq!(key, "sk-test-123");
    }

    #[test]
    fn env_var_is_read() {
        let auth = AuthConfig::default();
        let key = resolve_api_key_with(&auth, |name| {
            (name == "DEEPSEEK_API_KEY").then(|| "sk-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "sk-env");
    }

    #[test]
    fn missing_env_var_names_the_variable() {
        let auth = AuthConfig::default();
        let err = resolve_api_key_with(&auth, no_env).unwrap_err();
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn blank_env_value_counts_as_missing() {
        let auth = AuthConfig::default();
        assert!(resolve_api_key_with(&auth, |_| Some("  ".into())).is_err());
    }

    #[test]
    fn no_source_configured() {
        let auth = AuthConfig {
            env: None,
            ..Default::default()
        };
        let err = resolve_api_key_with(&auth, no_env).unwrap_err();
        assert!(err.to_string().contains("no API key configured"));
    }
}
