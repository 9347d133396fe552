pub mod config;
pub mod doctor;

use clap::{Parser, Subcommand};

/// smash: an AI code assistant backend.
#[derive(Debug, Parser)]
#[command(name = "smash", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `SMASH_CONFIG` (or
/// `config.toml` by default), then apply `PORT` / `MONGODB_URI` env
/// overrides. Returns the resolved [`Config`] and the path that was used.
///
/// [`Config`]: sm_domain::config::Config
pub fn load_config() -> anyhow::Result<(sm_domain::config::Config, String)> {
    let config_path =
        std::env::var("SMASH_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config = read_config(std::path::Path::new(&config_path))?;
    config.apply_env_overrides(|name| std::env::var(name).ok());

    Ok((config, config_path))
}

/// Parse `path`, or return defaults when it does not exist.
pub fn read_config(path: &std::path::Path) -> anyhow::Result<sm_domain::config::Config> {
    if !path.exists() {
        return Ok(sm_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}
