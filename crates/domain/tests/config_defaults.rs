use std::collections::HashMap;

use sm_domain::config::{Config, ConfigSeverity, PromptLocale, StoreBackend};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_file_yields_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.llm.model, "deepseek-reasoner");
    assert_eq!(config.prompt.locale, PromptLocale::Zh);
    assert_eq!(config.store.backend, StoreBackend::Json);
    assert_eq!(config.accounts.bcrypt_cost, 10);
}

#[test]
fn default_config_has_no_errors() {
    let issues = Config::default().validate();
    assert!(
        issues.iter().all(|i| i.severity != ConfigSeverity::Error),
        "unexpected errors: {issues:?}"
    );
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config.server.cors.allowed_origins.contains(&"http://localhost:*".to_string()));
    assert!(config.server.cors.allowed_origins.contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn sections_parse_together() {
    let toml_str = r#"
[server]
port = 8080
static_dir = "web"

[llm]
model = "deepseek-chat"

[prompt]
locale = "en"

[store]
backend = "mongodb"

[store.mongodb]
uri = "mongodb://db:27017/smash"

[accounts]
bcrypt_cost = 12
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.static_dir.to_str(), Some("web"));
    assert_eq!(config.llm.model, "deepseek-chat");
    assert_eq!(config.prompt.locale, PromptLocale::En);
    assert_eq!(config.store.backend, StoreBackend::Mongodb);
    assert_eq!(config.store.mongodb.uri, "mongodb://db:27017/smash");
    assert_eq!(config.accounts.bcrypt_cost, 12);
}

#[test]
fn low_bcrypt_cost_is_rejected() {
    let mut config = Config::default();
    config.accounts.bcrypt_cost = 4;
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "accounts.bcrypt_cost" && i.severity == ConfigSeverity::Error));
}

#[test]
fn zero_stream_timeout_is_rejected() {
    let mut config = Config::default();
    config.llm.stream_timeout_secs = 0;
    assert!(config
        .validate()
        .iter()
        .any(|i| i.field == "llm.stream_timeout_secs"));
}

#[test]
fn wildcard_cors_is_a_warning() {
    let mut config = Config::default();
    config.server.cors.allowed_origins = vec!["*".into()];
    let issue = config
        .validate()
        .into_iter()
        .find(|i| i.field == "server.cors.allowed_origins")
        .expect("wildcard warning");
    assert_eq!(issue.severity, ConfigSeverity::Warning);
}

#[test]
fn env_overrides_port_and_mongo_uri() {
    let mut config = Config::default();
    config.apply_env_overrides(env(&[
        ("PORT", "8081"),
        ("MONGODB_URI", "mongodb://mongo:27017/prod"),
    ]));
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.store.mongodb.uri, "mongodb://mongo:27017/prod");
}

#[test]
fn invalid_port_override_is_ignored() {
    let mut config = Config::default();
    config.apply_env_overrides(env(&[("PORT", "eighty")]));
    assert_eq!(config.server.port, 3000);
}

#[test]
fn absent_env_leaves_config_untouched() {
    let mut config = Config::default();
    config.apply_env_overrides(env(&[]));
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.store.mongodb.uri, "mongodb://localhost:27017/smash");
}
