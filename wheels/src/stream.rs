use anyhow::Result;
use async_fn_stream::fn_stream;
use futures::stream::BoxStream;
use serde_json::{json, Value};

/// A lazy, finite sequence of completion chunks, consumed exactly once.
/// The HTTP layer frames each value and terminates the transport itself.
pub type ChunkStream = BoxStream<'static, Result<Value>>;

/// A synthetic single-chunk stream carrying `{"message": …}`.
///
/// Used where the endpoint contract requires stream framing even though no
/// model stream ever ran (stored acknowledgments, empty-history replies).
#[must_use]
pub fn message(text: &str) -> ChunkStream {
    let chunk = json!({ "message": text });

    Box::pin(fn_stream(|emitter| async move {
        emitter.emit(Ok(chunk)).await;
    }))
}

/// A synthetic single-chunk stream carrying `{"error": …}`.
///
/// The degraded stand-in when stream setup fails: once SSE headers are out,
/// the transport still needs a well-formed body and terminator.
#[must_use]
pub fn error(text: &str) -> ChunkStream {
    let chunk = json!({ "error": text });

    Box::pin(fn_stream(|emitter| async move {
        emitter.emit(Ok(chunk)).await;
    }))
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    #[tokio::test]
    async fn synthetic_streams_emit_one_chunk() {
        let chunks: Vec<_> = super::message("stored").collect().await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].as_ref().unwrap()["message"],
            serde_json::json!("stored")
        );

        let chunks: Vec<_> = super::error("boom").collect().await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].as_ref().unwrap()["error"],
            serde_json::json!("boom")
        );
    }
}
