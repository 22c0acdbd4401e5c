//! Stream adapter that reassembles newline-delimited records from byte chunks.
//!
//! Both backend wire formats are line-framed, so the decoders share this
//! adapter. It buffers partial lines across chunk boundaries, which also
//! keeps multi-byte UTF-8 sequences intact when a chunk splits one.

use crate::Error;
use futures_util::{Stream, StreamExt};
use memchr::memchr;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Cap on buffered bytes for a single unterminated line.
const MAX_BUFFER: usize = 1_000_000;

/// A stream adapter that yields complete lines from a byte stream.
pub struct LineStream<S> {
    /// Label used when surfacing transport faults.
    backend: &'static str,
    /// The underlying byte stream
    inner: S,
    /// Buffer for an incomplete line from previous chunks
    buffer: Vec<u8>,
    /// Complete lines ready to be yielded
    lines: VecDeque<String>,
    /// Set once the inner stream is exhausted
    finished: bool,
}

impl<S> LineStream<S> {
    pub fn new(backend: &'static str, stream: S) -> Self {
        Self {
            backend,
            inner: stream,
            buffer: Vec::new(),
            lines: VecDeque::new(),
            finished: false,
        }
    }

    /// Split complete lines out of the buffer into the ready queue.
    fn split_buffer(&mut self) {
        let mut start = 0;
        while let Some(pos) = memchr(b'\n', &self.buffer[start..]) {
            let line_end = start + pos;
            self.push_line(start, line_end);
            start = line_end + 1;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
    }

    fn push_line(&mut self, start: usize, end: usize) {
        let mut bytes = &self.buffer[start..end];
        if bytes.last() == Some(&b'\r') {
            bytes = &bytes[..bytes.len() - 1];
        }
        match std::str::from_utf8(bytes) {
            Ok(line) => self.lines.push_back(line.to_string()),
            Err(e) => {
                // Tolerated like any other malformed line.
                tracing::debug!(backend = self.backend, error = %e, "skipping non-UTF-8 line");
            }
        }
    }
}

impl<S, E> Stream for LineStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<String, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // Yield already-split lines first (FIFO order)
            if let Some(line) = self.lines.pop_front() {
                return Poll::Ready(Some(Ok(line)));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::request_failed(
                        self.backend,
                        format!("stream error: {}", e.into()),
                    ))));
                }
                None => {
                    self.finished = true;
                    // A stream may end without a trailing newline; flush the
                    // remainder as a final line.
                    if !self.buffer.is_empty() {
                        let end = self.buffer.len();
                        self.push_line(0, end);
                        self.buffer.clear();
                    }
                    continue;
                }
            };

            self.buffer.extend_from_slice(&chunk);

            if self.buffer.len() > MAX_BUFFER {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::request_failed(
                    self.backend,
                    "line buffer exceeded maximum size",
                ))));
            }

            self.split_buffer();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: Vec<&'static [u8]>) -> impl Stream<Item = Result<bytes::Bytes, std::io::Error>> {
        stream::iter(
            parts
                .into_iter()
                .map(|p| Ok(bytes::Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(parts: Vec<&'static [u8]>) -> Vec<String> {
        let mut lines = LineStream::new("test", chunks(parts));
        let mut out = Vec::new();
        while let Some(line) = lines.next().await {
            out.push(line.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_complete_lines() {
        let out = collect(vec![b"one\ntwo\n"]).await;
        assert_eq!(out, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_line_split_across_chunks() {
        let out = collect(vec![b"hel", b"lo\nwor", b"ld\n"]).await;
        assert_eq!(out, vec!["hello", "world"]);
    }

    #[tokio::test]
    async fn test_missing_trailing_newline() {
        let out = collect(vec![b"alpha\nbeta"]).await;
        assert_eq!(out, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_crlf_terminated_lines() {
        let out = collect(vec![b"one\r\ntwo\r\n"]).await;
        assert_eq!(out, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        // Euro sign is three bytes: E2 82 AC
        let euro = "€".as_bytes();
        let first: &'static [u8] = Box::leak([b"price ".as_slice(), &euro[..2]].concat().into());
        let second: &'static [u8] = Box::leak([&euro[2..], b"100\n"].concat().into());
        let out = collect(vec![first, second]).await;
        assert_eq!(out, vec!["price €100"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let out = collect(vec![b"good\n\xFF\xFEbad\nalso good\n"]).await;
        assert_eq!(out, vec!["good", "also good"]);
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let parts: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::from_static(b"ok\n")),
            Err(std::io::Error::other("reset")),
        ];
        let mut lines = LineStream::new("test", stream::iter(parts));
        assert_eq!(lines.next().await.unwrap().unwrap(), "ok");
        let err = lines.next().await.unwrap().unwrap_err();
        assert!(matches!(err, Error::RequestFailed { .. }));
    }
}
