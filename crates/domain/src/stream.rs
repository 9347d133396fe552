use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A boxed async stream, used for LLM streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Events emitted during LLM streaming (provider-agnostic).
///
/// Each upstream chunk maps to at most one of `Thinking` or `Token`: a
/// non-empty reasoning delta wins, otherwise the content delta is used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A reasoning ("chain of thought") chunk.
    #[serde(rename = "thinking")]
    Thinking { text: String },

    /// A final-answer text chunk.
    #[serde(rename = "token")]
    Token { text: String },

    /// Stream is finished.
    #[serde(rename = "done")]
    Done {
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },

    /// The upstream reported an error inside the stream body.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Token usage for a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
