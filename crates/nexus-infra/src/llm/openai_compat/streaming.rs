//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] chunks to the
//! provider-agnostic [`StreamEvent`] enum. `Connected` is emitted on entry
//! (before the first chunk arrives), each non-empty content delta becomes a
//! `TextDelta`, and `Done` closes the sequence.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use async_openai::types::chat::ChatCompletionResponseStream;

use nexus_types::llm::{LlmError, StreamEvent};

/// Map an async-openai [`ChatCompletionResponseStream`] to a stream of [`StreamEvent`]s.
pub fn map_openai_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            // Typically one choice per chunk; the final usage-only chunk has none.
            for choice in &chunk.choices {
                if let Some(text) = choice.delta.content.clone() {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text };
                    }
                }
            }
        }

        yield StreamEvent::Done;
    })
}
