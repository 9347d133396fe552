//! Folds a provider stream into the two accumulated texts.

use futures_util::StreamExt;

use sm_domain::error::{Error, Result};
use sm_domain::stream::{BoxStream, StreamEvent, Usage};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    /// Concatenated reasoning deltas. Logged by length only.
    pub reasoning_content: String,
    /// Concatenated answer deltas.
    pub final_content: String,
    pub usage: Option<Usage>,
}

/// Drain `stream` to completion, preserving arrival order.
///
/// An `Err` item or an in-band `Error` event aborts with no partial result.
pub async fn aggregate(
    provider: &str,
    mut stream: BoxStream<'static, Result<StreamEvent>>,
) -> Result<AggregatedResult> {
    let mut out = AggregatedResult::default();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Thinking { text } => out.reasoning_content.push_str(&text),
            StreamEvent::Token { text } => out.final_content.push_str(&text),
            StreamEvent::Done { usage, .. } => {
                if usage.is_some() {
                    out.usage = usage;
                }
            }
            StreamEvent::Error { message } => {
                return Err(Error::Provider {
                    provider: provider.to_string(),
                    message,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_domain::error::ErrorKind;

    fn boxed(events: Vec<Result<StreamEvent>>) -> BoxStream<'static, Result<StreamEvent>> {
        Box::pin(futures_util::stream::iter(events))
    }

    fn thinking(t: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::Thinking { text: t.into() })
    }

    fn token(t: &str) -> Result<StreamEvent> {
        Ok(StreamEvent::Token { text: t.into() })
    }

    #[tokio::test]
    async fn interleaved_events_split_by_kind() {
        let stream = boxed(vec![
            thinking("a"),
            token("1"),
            thinking("b"),
            token("2"),
            token("3"),
            thinking("c"),
            Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            }),
        ]);

        let out = aggregate("test", stream).await.unwrap();
        assert_eq!(out.reasoning_content, "abc");
        assert_eq!(out.final_content, "123");
        assert!(out.usage.is_none());
    }

    #[tokio::test]
    async fn usage_from_any_done_is_kept() {
        let usage = Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };
        let stream = boxed(vec![
            token("x"),
            Ok(StreamEvent::Done {
                usage: Some(usage),
                finish_reason: None,
            }),
            Ok(StreamEvent::Done {
                usage: None,
                finish_reason: None,
            }),
        ]);

        let out = aggregate("test", stream).await.unwrap();
        assert_eq!(out.usage, Some(usage));
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_result() {
        let out = aggregate("test", boxed(vec![])).await.unwrap();
        assert_eq!(out, AggregatedResult::default());
    }

    #[tokio::test]
    async fn transport_error_aborts() {
        let stream = boxed(vec![token("partial"), Err(Error::Http("reset".into()))]);
        let err = aggregate("test", stream).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn in_band_error_becomes_provider_error() {
        let stream = boxed(vec![
            token("partial"),
            Ok(StreamEvent::Error {
                message: "overloaded".into(),
            }),
            token("never seen"),
        ]);
        match aggregate("deepseek", stream).await.unwrap_err() {
            Error::Provider { provider, message } => {
                assert_eq!(provider, "deepseek");
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
