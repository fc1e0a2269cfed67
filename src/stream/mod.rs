//! Ingestion of `data: <json>` event streams.

mod decoder;
mod reducer;
mod types;

pub use decoder::{Decoded, LineDecoder};
pub use reducer::EventReducer;
pub use types::{EventFrame, FrameKind, StreamResult, StreamStatus};

use futures_core::Stream;
use tokio_stream::StreamExt;

/// Drive a byte stream through a fresh decoder and reducer.
///
/// An error from the source ends the read with an `Interrupted` status;
/// everything reduced before it is kept.
pub async fn collect<S, B, E>(source: S) -> StreamResult
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    tokio::pin!(source);

    let mut decoder = LineDecoder::new();
    let mut reducer = EventReducer::new();
    let mut status = StreamStatus::Complete;

    while let Some(item) = source.next().await {
        let chunk = match item {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, frames = reducer.frames().len(), "stream interrupted");
                status = StreamStatus::Interrupted {
                    reason: e.to_string(),
                };
                break;
            }
        };

        let Decoded { text, lines } = decoder.push(chunk.as_ref());
        reducer.push_text(&text);
        for line in &lines {
            reducer.push_line(line);
        }
    }

    if let Some(tail) = decoder.finish() {
        // Upstream may close without a final newline; the tail is not actionable.
        tracing::debug!(tail = %tail, "discarding unterminated trailing fragment");
    }

    let out = reducer.finish(status);
    tracing::debug!(frames = out.frames.len(), skipped = out.skipped, "stream reduced");
    out
}
