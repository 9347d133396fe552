use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging and OpenTelemetry export settings.
///
/// With no `otlp_endpoint` the server only writes JSON log lines. Setting
/// it adds an OTLP/gRPC exporter so `tracing` spans (including the
/// per-request `llm.call` span) reach a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "d_log_filter")]
    pub log_filter: String,

    /// OTLP gRPC endpoint (e.g. `http://localhost:4317`).
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// The `service.name` resource attribute reported to the collector.
    #[serde(default = "d_service_name")]
    pub service_name: String,

    /// Trace sampling ratio in `[0.0, 1.0]`.
    #[serde(default = "d_sample_rate")]
    pub sample_rate: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: d_log_filter(),
            otlp_endpoint: None,
            service_name: d_service_name(),
            sample_rate: d_sample_rate(),
        }
    }
}

fn d_log_filter() -> String {
    "info,sm_gateway=debug".into()
}

fn d_service_name() -> String {
    "smash".into()
}

fn d_sample_rate() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_disables_export() {
        let cfg: ObservabilityConfig = toml::from_str("").unwrap();
        assert!(cfg.otlp_endpoint.is_none());
        assert_eq!(cfg.service_name, "smash");
        assert_eq!(cfg.log_filter, "info,sm_gateway=debug");
        assert!((cfg.sample_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn endpoint_and_sampling_parse() {
        let toml_str = r#"
            otlp_endpoint = "http://localhost:4317"
            sample_rate = 0.25
        "#;
        let cfg: ObservabilityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
        assert!((cfg.sample_rate - 0.25).abs() < f64::EPSILON);
    }
}
