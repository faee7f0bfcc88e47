//! Reading an OpenAI `text/event-stream` response body.
//!
//! Bytes are split into lines with [`LineSplitter`] and folded by
//! [`StreamAssembler`]. Raw chunks are forwarded before they are parsed so the
//! caller sees exactly what the provider sent.

use futures_util::StreamExt;

use parley_core::llm::assembler::{LineOutcome, LineSplitter, StreamAssembler};
use parley_core::llm::provider::ChunkSender;
use parley_types::error::ProviderError;

/// Drain `response` and return the assembled reply text.
///
/// A stream that ends without `data: [DONE]` still yields whatever text
/// arrived. Bytes after the sentinel are ignored.
pub(crate) async fn read_event_stream(
    response: reqwest::Response,
    forward: Option<&ChunkSender>,
) -> Result<String, ProviderError> {
    let mut body = response.bytes_stream();
    let mut splitter = LineSplitter::new();
    let mut assembler = StreamAssembler::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| ProviderError::Transport(e.to_string()))?;

        if let Some(tx) = forward {
            tx.send(chunk.to_vec())
                .await
                .map_err(|_| ProviderError::Disconnected)?;
        }

        for line in splitter.push(&chunk) {
            if assembler.push_line(&line) == LineOutcome::Done {
                return Ok(finish(assembler));
            }
        }
    }

    if let Some(rest) = splitter.finish() {
        assembler.push_line(&rest);
    }
    if !assembler.is_done() {
        tracing::debug!("event stream ended without [DONE]");
    }
    Ok(finish(assembler))
}

fn finish(assembler: StreamAssembler) -> String {
    if assembler.malformed() > 0 {
        tracing::warn!(skipped = assembler.malformed(), "skipped malformed stream events");
    }
    assembler.finish()
}
