use sm_domain::error::Result;
use sm_domain::message::Message;
use sm_domain::stream::{BoxStream, StreamEvent};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send.
    pub messages: Vec<Message>,
    /// Sampling temperature (0.0 to 2.0). `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Maximum tokens in the response. `None` lets the provider choose.
    pub max_tokens: Option<u32>,
    /// Model identifier override. When `None`, the provider uses its default.
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait every chat-completion backend implements.
///
/// The returned stream is lazy, finite and not restartable: it ends after
/// the upstream's end-of-stream marker (or a transport error item).
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Open a streaming chat completion.
    ///
    /// Fails before yielding anything when the connection cannot be
    /// established or the endpoint answers with a non-success status.
    async fn chat_stream(
        &self,
        req: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;

    /// The model used when a request does not override it.
    fn default_model(&self) -> &str;
}
