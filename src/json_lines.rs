//! Stream decoder for the local daemon's newline-delimited JSON framing.
//!
//! One JSON object per line, each carrying a `response` text fragment and a
//! `done` flag. Decoding stops at the first `done: true` line even if more
//! bytes arrive after it.

use crate::lines::LineStream;
use crate::types::StreamFragment;
use crate::Error;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Decodes a newline-delimited JSON body into an ordered sequence of
/// fragments. Parse failures are skipped (a chunk can arrive split across
/// reads); the end-of-stream marker follows the first `done: true` line or
/// the end of input.
pub struct JsonLines<S> {
    lines: LineStream<S>,
    backend: &'static str,
    finished: bool,
    end_emitted: bool,
}

impl<S> JsonLines<S> {
    pub fn new(backend: &'static str, stream: S) -> Self {
        Self {
            lines: LineStream::new(backend, stream),
            backend,
            finished: false,
            end_emitted: false,
        }
    }
}

impl<S, E> Stream for JsonLines<S>
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
                    self.finished = true;
                    continue;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<GenerateChunk>(line) {
                Ok(chunk) => {
                    if chunk.done {
                        self.finished = true;
                    }
                    if !chunk.response.is_empty() {
                        return Poll::Ready(Some(Ok(StreamFragment::piece(chunk.response))));
                    }
                }
                Err(e) => {
                    tracing::debug!(backend = self.backend, error = %e, "skipping unparseable line");
                }
            }
        }
    }
}
