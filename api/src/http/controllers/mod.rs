use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tracing::error;
use wheels::stream::ChunkStream;

pub mod agent;
pub mod meeting;

pub use agent as AgentController;
pub use meeting as MeetingController;

/// Frames completion chunks as SSE `data:` lines. The stream always closes
/// with the literal `[DONE]` terminator, failures included — once headers
/// are out, the transport contract demands it.
pub(crate) fn relay(chunks: ChunkStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = chunks
        .map(|chunk| {
            let event = match chunk {
                Ok(value) => Event::default().json_data(value).unwrap(),
                Err(err) => {
                    error!("Stream chunk failed: {err:#}");
                    Event::default()
                        .json_data(json!({ "error": "Something went wrong!" }))
                        .unwrap()
                }
            };

            Ok::<_, Infallible>(event)
        })
        .chain(tokio_stream::once(Ok(Event::default().data("[DONE]"))));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
