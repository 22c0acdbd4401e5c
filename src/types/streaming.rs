//! Types for streaming responses.

/// One unit of incremental text produced by a stream decoder.
///
/// Decoders emit zero or more content fragments followed by exactly one
/// end-of-stream marker. Fragments are transient: the accumulator folds
/// them into the final text and nothing is retained afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFragment {
    pub text: String,
    /// True only for the end-of-stream marker.
    pub last: bool,
}

impl StreamFragment {
    /// A content fragment.
    pub fn piece(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            last: false,
        }
    }

    /// The end-of-stream marker. Carries no payload.
    pub fn end() -> Self {
        Self {
            text: String::new(),
            last: true,
        }
    }
}
