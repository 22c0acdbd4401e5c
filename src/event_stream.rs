//! Stream decoder for the remote gateway's event-stream framing.
//!
//! The wire format is newline-delimited records: keep-alive comments,
//! `data: <json>` payloads, and a literal `data: [DONE]` sentinel marking
//! graceful completion. Each payload carries at most one content delta at
//! `choices[0].delta.content`.

use crate::lines::LineStream;
use crate::types::StreamFragment;
use crate::Error;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Decodes an event-stream body into an ordered sequence of fragments.
///
/// Emits one content fragment per extracted delta, then a single
/// end-of-stream marker once the sentinel (or the end of input) is seen.
/// Malformed and heartbeat lines are skipped, never fatal.
pub struct EventStream<S> {
    lines: LineStream<S>,
    backend: &'static str,
    finished: bool,
    end_emitted: bool,
}

impl<S> EventStream<S> {
    pub fn new(backend: &'static str, stream: S) -> Self {
        Self {
            lines: LineStream::new(backend, stream),
            backend,
            finished: false,
            end_emitted: false,
        }
    }
}

impl<S, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<StreamFragment, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.finished {
                if self.end_emitted {
                    return Poll::Ready(None);
                }
                self.end_emitted = true;
                return Poll::Ready(Some(Ok(StreamFragment::end())));
            }

            let line = match ready!(self.lines.poll_next_unpin(cx)) {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    self.end_emitted = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    // Stream closed without the sentinel; still ends cleanly.
                    self.finished = true;
                    continue;
                }
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                self.finished = true;
                continue;
            }

            match serde_json::from_str::<ChatChunk>(data) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);
                    if let Some(content) = content {
                        if !content.is_empty() {
                            return Poll::Ready(Some(Ok(StreamFragment::piece(content))));
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(backend = self.backend, error = %e, "skipping malformed event-stream line");
                }
            }
        }
    }
}
