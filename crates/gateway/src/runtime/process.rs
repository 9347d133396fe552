//! The `/api/process` pipeline: prompt, stream, aggregate, format, record.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer};
use tracing::Instrument;

use sm_accounts::HistoryEntry;
use sm_domain::action::Action;
use sm_domain::error::{Error, Result};
use sm_domain::trace::TraceEvent;
use sm_providers::ChatRequest;

use super::aggregate::{aggregate, AggregatedResult};
use super::format::format_response;
use super::prompt::build_messages;
use crate::state::AppState;

/// Body of `POST /api/process`. Missing and `null` fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessInput {
    #[serde(deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub action: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub language: String,
    pub description: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Run one request end to end and return the formatted answer.
///
/// History is appended only after every earlier stage succeeded. Failures
/// are logged here with full detail; callers only see the error value.
pub async fn process_request(state: &AppState, input: ProcessInput) -> Result<String> {
    let action = Action::parse(&input.action);
    tracing::info!(
        username = %input.username,
        action = %action,
        code_chars = input.code.chars().count(),
        "process request received"
    );

    match run_pipeline(state, &input, action).await {
        Ok(formatted) => Ok(formatted),
        Err(e) => {
            tracing::error!(
                username = %input.username,
                action = %action,
                error = %e,
                "error processing request"
            );
            TraceEvent::ProcessFailed {
                username: input.username.clone(),
                action: action.as_str().to_string(),
                kind: e.kind().as_str().to_string(),
            }
            .emit();
            Err(e)
        }
    }
}

async fn run_pipeline(state: &AppState, input: &ProcessInput, action: Action) -> Result<String> {
    let started = Instant::now();

    let messages = build_messages(
        action,
        &input.code,
        &input.language,
        input.description.as_deref(),
        state.config.prompt.locale,
    );
    let result = call_model(state, ChatRequest::new(messages)).await?;

    tracing::debug!(
        reasoning_chars = result.reasoning_content.chars().count(),
        content_chars = result.final_content.chars().count(),
        "model response aggregated"
    );

    let formatted = format_response(action, &result.final_content);

    let entries = state
        .history
        .append(&input.username, HistoryEntry::now(&input.code, action))
        .await?;
    TraceEvent::HistoryRecorded {
        username: input.username.clone(),
        entries,
    }
    .emit();

    TraceEvent::ProcessCompleted {
        username: input.username.clone(),
        action: action.as_str().to_string(),
        reasoning_chars: result.reasoning_content.chars().count(),
        content_chars: result.final_content.chars().count(),
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();

    Ok(formatted)
}

/// Open the upstream stream and drain it, bounded by `stream_timeout_secs`.
async fn call_model(state: &AppState, req: ChatRequest) -> Result<AggregatedResult> {
    let provider = state
        .llm
        .as_ref()
        .ok_or_else(|| Error::Config("no LLM provider configured (missing API key?)".into()))?;

    let model = req
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());
    let llm_call_span = tracing::info_span!(
        "llm.call",
        "otel.kind" = "CLIENT",
        provider = provider.provider_id(),
        model = %model,
        input_tokens = tracing::field::Empty,
        output_tokens = tracing::field::Empty,
    );

    let limit = Duration::from_secs(state.config.llm.stream_timeout_secs);
    let started = Instant::now();

    let call = async {
        let stream = provider.chat_stream(&req).await?;
        aggregate(provider.provider_id(), stream).await
    }
    .instrument(llm_call_span.clone());

    let result = tokio::time::timeout(limit, call).await.map_err(|_| {
        Error::Timeout(format!(
            "upstream stream did not finish within {}s",
            limit.as_secs()
        ))
    })??;

    if let Some(u) = &result.usage {
        llm_call_span.record("input_tokens", u.prompt_tokens);
        llm_call_span.record("output_tokens", u.completion_tokens);
    }

    TraceEvent::LlmRequest {
        provider: provider.provider_id().to_string(),
        model,
        streaming: true,
        duration_ms: started.elapsed().as_millis() as u64,
        prompt_tokens: result.usage.map(|u| u.prompt_tokens),
        completion_tokens: result.usage.map(|u| u.completion_tokens),
    }
    .emit();

    Ok(result)
}
