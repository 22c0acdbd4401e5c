//! Outbound boundary to the presentation layer.

/// Receives generation progress for display. The core pushes fragments and
/// the completed text through this trait and knows nothing about rendering.
pub trait ProgressSink: Send + Sync {
    /// One incremental fragment, in arrival order.
    fn fragment(&self, text: &str);

    /// The complete accumulated text, pushed once after the stream ends.
    fn complete(&self, text: &str);
}
