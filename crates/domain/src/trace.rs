use serde::Serialize;

/// Structured trace events emitted across all smash crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    LlmRequest {
        provider: String,
        model: String,
        streaming: bool,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ProcessCompleted {
        username: String,
        action: String,
        reasoning_chars: usize,
        content_chars: usize,
        duration_ms: u64,
    },
    ProcessFailed {
        username: String,
        action: String,
        kind: String,
    },
    HistoryRecorded {
        username: String,
        entries: usize,
    },
    UserRegistered {
        username: String,
    },
    LoginAttempt {
        username: String,
        success: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sm_event");
    }
}
