//! Fold a fragment stream into the final generated text.

use crate::sink::ProgressSink;
use crate::types::StreamFragment;
use crate::Error;
use futures_util::{Stream, StreamExt};

/// Consume a decoder's fragment stream and return the accumulated text.
///
/// The fold stops at the end-of-stream marker. Each non-empty fragment is
/// forwarded to the sink as it arrives; the complete text is pushed once at
/// the end. A stream that yields no content despite a successful handshake
/// is an [`Error::EmptyResponse`], never an empty-string success.
pub async fn accumulate<S>(mut stream: S, sink: Option<&dyn ProgressSink>) -> Result<String, Error>
where
    S: Stream<Item = Result<StreamFragment, Error>> + Unpin,
{
    let mut text = String::new();

    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if fragment.last {
            break;
        }
        if fragment.text.is_empty() {
            continue;
        }
        if let Some(sink) = sink {
            sink.fragment(&fragment.text);
        }
        text.push_str(&fragment.text);
    }

    if text.is_empty() {
        return Err(Error::EmptyResponse);
    }
    if let Some(sink) = sink {
        sink.complete(&text);
    }
    Ok(text)
}
