//! End-to-end streaming against a mock chat-completions server.

use futures_util::StreamExt;
use sm_domain::config::LlmConfig;
use sm_domain::error::{ErrorKind, Result};
use sm_domain::message::Message;
use sm_domain::stream::StreamEvent;
use sm_providers::{ChatRequest, LlmProvider, OpenAiCompatProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
    let cfg = LlmConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    OpenAiCompatProvider::with_api_key(&cfg, "sk-test".into()).unwrap()
}

fn sse_body(chunks: &[&str]) -> String {
    let mut body: String = chunks.iter().map(|c| format!("data: {c}\n\n")).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

async fn collect(provider: &OpenAiCompatProvider) -> Result<Vec<Result<StreamEvent>>> {
    let req = ChatRequest::new(vec![Message::user("explain this")]);
    let stream = provider.chat_stream(&req).await?;
    Ok(stream.collect().await)
}

#[tokio::test]
async fn streams_reasoning_then_content() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        r#"{"choices":[{"delta":{"role":"assistant","content":""}}]}"#,
        r#"{"choices":[{"delta":{"reasoning_content":"User wants "}}]}"#,
        r#"{"choices":[{"delta":{"reasoning_content":"an explanation."}}]}"#,
        r#"{"choices":[{"delta":{"content":"This code "}}]}"#,
        r#"{"choices":[{"delta":{"content":"adds numbers."},"finish_reason":"stop"}]}"#,
    ]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "deepseek-reasoner",
            "stream": true,
            "messages": [{"role": "user", "content": "explain this"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let events: Vec<StreamEvent> = collect(&provider_for(&server))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.unwrap())
        .collect();

    let thinking: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Thinking { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    let tokens: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Token { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(thinking, "User wants an explanation.");
    assert_eq!(tokens, "This code adds numbers.");
    assert!(matches!(events.last(), Some(StreamEvent::Done { .. })));
}

#[tokio::test]
async fn missing_done_sentinel_still_terminates() {
    let server = MockServer::start().await;
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events = collect(&provider_for(&server)).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events.last(),
        Some(Ok(StreamEvent::Done { .. }))
    ));
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_string(
            r#"{"error":{"message":"Insufficient Balance"}}"#,
        ))
        .mount(&server)
        .await;

    let err = collect(&provider_for(&server)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("402"));
}

#[tokio::test]
async fn unreachable_endpoint_is_upstream_error() {
    let cfg = LlmConfig {
        // Port 9 (discard) on localhost is closed in test environments.
        base_url: "http://127.0.0.1:9".into(),
        connect_timeout_secs: 2,
        ..Default::default()
    };
    let provider = OpenAiCompatProvider::with_api_key(&cfg, "sk-test".into()).unwrap();
    let err = collect(&provider).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upstream);
}
