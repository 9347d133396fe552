//! Server-sent-events framing for streaming chat completions.
//!
//! The decoder buffers raw bytes and only decodes complete event blocks,
//! so a multi-byte UTF-8 character split across two network chunks is
//! never mangled. Blocks are delimited by a blank line (`\n\n` or
//! `\r\n\r\n`); only `data:` lines are kept.

use crate::util::from_reqwest;
use sm_domain::error::Result;
use sm_domain::stream::{BoxStream, StreamEvent};

/// Incremental SSE decoder yielding `data:` payloads.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed a network chunk and return every payload completed by it.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        self.drain_complete()
    }

    /// Flush a trailing event that the server closed without a blank line.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return Vec::new();
        }
        self.buffer.extend_from_slice(b"\n\n");
        self.drain_complete()
    }

    /// Bytes still waiting for an event delimiter.
    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        &self.buffer
    }

    fn drain_complete(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();

        while let Some((end, delim_len)) = find_event_end(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + delim_len).collect();
            let block = String::from_utf8_lossy(&block[..end]);

            for line in block.lines() {
                if let Some(data) = line.trim().strip_prefix("data:") {
                    let data = data.trim();
                    if !data.is_empty() {
                        payloads.push(data.to_string());
                    }
                }
            }
        }

        payloads
    }
}

/// Position and length of the earliest event delimiter in `buf`.
fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buf, b"\n\n").map(|p| (p, 2));
    let crlf = find(buf, b"\r\n\r\n").map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Build a [`BoxStream`] from an SSE `reqwest::Response` and a payload
/// parser.
///
/// The stream:
/// 1. Decodes incoming chunks into `data:` payloads
/// 2. Flushes the remaining buffer when the response body closes
/// 3. Emits a fallback `Done` event if the parser never produced one
/// 4. Ends after the first transport error, which is yielded as `Err`
pub(crate) fn sse_response_stream<F>(
    response: reqwest::Response,
    mut parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut response = response;
        let mut decoder = SseDecoder::default();
        let mut done_emitted = false;

        loop {
            let (payloads, body_closed) = match response.chunk().await {
                Ok(Some(bytes)) => (decoder.push(&bytes), false),
                Ok(None) => (decoder.finish(), true),
                Err(e) => {
                    yield Err(from_reqwest(e));
                    // A broken body must not look like a clean finish.
                    done_emitted = true;
                    break;
                }
            };

            for data in payloads {
                for event in parse_data(&data) {
                    if matches!(&event, Ok(StreamEvent::Done { .. })) {
                        done_emitted = true;
                    }
                    yield event;
                }
            }

            if body_closed {
                break;
            }
        }

        if !done_emitted {
            yield Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            });
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
