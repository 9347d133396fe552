//! OpenAI-compatible streaming adapter.
//!
//! Works with DeepSeek, OpenAI, Ollama, vLLM and anything else that speaks
//! the chat-completions contract. DeepSeek's reasoning models add a
//! `reasoning_content` field to each delta; it is surfaced as
//! [`StreamEvent::Thinking`].

use std::time::Duration;

use crate::traits::{ChatRequest, LlmProvider};
use crate::util::{from_reqwest, resolve_api_key};
use serde_json::Value;
use sm_domain::config::LlmConfig;
use sm_domain::error::{Error, Result};
use sm_domain::message::Message;
use sm_domain::stream::{BoxStream, StreamEvent, Usage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    auth_header: String,
    auth_prefix: String,
    default_model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatProvider {
    /// Create a provider from config, resolving the API key from the
    /// environment.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.auth)?;
        Self::with_api_key(cfg, api_key)
    }

    /// Create a provider with an already-resolved API key.
    pub fn with_api_key(cfg: &LlmConfig, api_key: String) -> Result<Self> {
        // No total request timeout: reasoning streams can run for minutes.
        // The pipeline bounds the whole stream instead.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            auth_header: cfg
                .auth
                .header
                .clone()
                .unwrap_or_else(|| "Authorization".into()),
            auth_prefix: cfg.auth.prefix.clone().unwrap_or_else(|| "Bearer ".into()),
            default_model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();
        let model = req.model.as_deref().unwrap_or(&self.default_model);

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": true,
            "stream_options": {"include_usage": true},
        });

        if let Some(temp) = req.temperature.or(self.temperature) {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens.or(self.max_tokens) {
            body["max_tokens"] = serde_json::json!(max);
        }
        body
    }
}

fn msg_to_openai(msg: &Message) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SSE payload parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn non_empty_str<'a>(v: &'a Value, field: &str) -> Option<&'a str> {
    v.get(field).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn parse_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

/// Turn one `data:` payload into stream events.
///
/// A chunk yields its reasoning delta when that is non-empty and its
/// content delta otherwise, never both. A chunk carrying a
/// `finish_reason` additionally yields `Done`.
pub(crate) fn parse_sse_data(data: &str) -> Vec<Result<StreamEvent>> {
    if data.trim() == "[DONE]" {
        return vec![Ok(StreamEvent::Done {
            usage: None,
            finish_reason: Some("stop".into()),
        })];
    }

    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Json(e))],
    };

    if let Some(err) = v.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| err.to_string());
        return vec![Ok(StreamEvent::Error { message })];
    }

    let usage = v.get("usage").and_then(parse_usage);
    let choice = v
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first());

    let Some(choice) = choice else {
        // Usage-only chunk (stream_options.include_usage).
        return match usage {
            Some(usage) => vec![Ok(StreamEvent::Done {
                usage: Some(usage),
                finish_reason: None,
            })],
            None => Vec::new(),
        };
    };

    let mut events = Vec::new();
    let delta = choice.get("delta").unwrap_or(&Value::Null);
    if let Some(text) = non_empty_str(delta, "reasoning_content") {
        events.push(Ok(StreamEvent::Thinking {
            text: text.to_string(),
        }));
    } else if let Some(text) = non_empty_str(delta, "content") {
        events.push(Ok(StreamEvent::Token {
            text: text.to_string(),
        }));
    }

    if let Some(fr) = choice.get("finish_reason").and_then(|f| f.as_str()) {
        events.push(Ok(StreamEvent::Done {
            usage,
            finish_reason: Some(fr.to_string()),
        }));
    }

    events
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat_stream(
        &self,
        req: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let url = self.chat_url();
        let body = self.build_chat_body(req);

        tracing::debug!(provider = %self.id, url = %url, "openai_compat stream request");

        let resp = self
            .client
            .post(&url)
            .header(
                self.auth_header.as_str(),
                format!("{}{}", self.auth_prefix, self.api_key),
            )
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let err_text = resp.text().await.unwrap_or_default();
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), err_text),
            });
        }

        Ok(crate::sse::sse_response_stream(resp, parse_sse_data))
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn only(events: Vec<Result<StreamEvent>>) -> StreamEvent {
        assert_eq!(events.len(), 1, "expected exactly one event: {events:?}");
        events.into_iter().next().unwrap().unwrap()
    }

    #[test]
    fn reasoning_delta_becomes_thinking() {
        let data = r#"{"choices":[{"index":0,"delta":{"reasoning_content":"Let me see","content":null}}]}"#;
        assert_eq!(
            only(parse_sse_data(data)),
            StreamEvent::Thinking {
                text: "Let me see".into()
            }
        );
    }

    #[test]
    fn content_delta_becomes_token() {
        let data = r#"{"choices":[{"index":0,"delta":{"reasoning_content":null,"content":"fn main"}}]}"#;
        assert_eq!(
            only(parse_sse_data(data)),
            StreamEvent::Token {
                text: "fn main".into()
            }
        );
    }

    #[test]
    fn reasoning_wins_when_both_present() {
        let data = r#"{"choices":[{"delta":{"reasoning_content":"think","content":"answer"}}]}"#;
        assert_eq!(
            only(parse_sse_data(data)),
            StreamEvent::Thinking {
                text: "think".into()
            }
        );
    }

    #[test]
    fn empty_reasoning_falls_through_to_content() {
        let data = r#"{"choices":[{"delta":{"reasoning_content":"","content":"answer"}}]}"#;
        assert_eq!(
            only(parse_sse_data(data)),
            StreamEvent::Token {
                text: "answer".into()
            }
        );
    }

    #[test]
    fn role_only_delta_yields_nothing() {
        let data = r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#;
        assert!(parse_sse_data(data).is_empty());
    }

    #[test]
    fn finish_reason_yields_done_after_last_token() {
        let data = r#"{"choices":[{"delta":{"content":"."},"finish_reason":"stop"}],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;
        let events: Vec<StreamEvent> = parse_sse_data(data)
            .into_iter()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::Token { text: ".".into() });
        match &events[1] {
            StreamEvent::Done {
                usage,
                finish_reason,
            } => {
                assert_eq!(finish_reason.as_deref(), Some("stop"));
                assert_eq!(usage.map(|u| u.total_tokens), Some(15));
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn usage_only_chunk_yields_done() {
        let data = r#"{"choices":[],"usage":{"prompt_tokens":3,"completion_tokens":4,"total_tokens":7}}"#;
        match only(parse_sse_data(data)) {
            StreamEvent::Done { usage, .. } => assert_eq!(usage.unwrap().completion_tokens, 4),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn done_sentinel() {
        assert!(matches!(
            only(parse_sse_data("[DONE]")),
            StreamEvent::Done { .. }
        ));
    }

    #[test]
    fn inline_error_object() {
        let data = r#"{"error":{"message":"Insufficient Balance","type":"unknown_error"}}"#;
        assert_eq!(
            only(parse_sse_data(data)),
            StreamEvent::Error {
                message: "Insufficient Balance".into()
            }
        );
    }

    #[test]
    fn malformed_json_is_an_error_item() {
        let events = parse_sse_data("{not json");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(Error::Json(_))));
    }

    #[test]
    fn body_uses_configured_model_and_streams() {
        let cfg = LlmConfig {
            max_tokens: Some(2048),
            ..Default::default()
        };
        let provider = OpenAiCompatProvider::with_api_key(&cfg, "sk-test".into()).unwrap();
        let req = ChatRequest::new(vec![Message::user("hi")]);
        let body = provider.build_chat_body(&req);

        assert_eq!(body["model"], "deepseek-reasoner");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 2048);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider =
            OpenAiCompatProvider::with_api_key(&LlmConfig::default(), "sk-secret".into()).unwrap();
        assert!(!format!("{provider:?}").contains("sk-secret"));
    }
}
