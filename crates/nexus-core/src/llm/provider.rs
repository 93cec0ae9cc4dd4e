//! LlmProvider trait definition.
//!
//! The core abstraction over completion providers. Uses RPITIT for
//! `complete`, and `Pin<Box<dyn Stream>>` for `stream` (streams need to be
//! object-safe for the BoxLlmProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use nexus_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Trait for completion provider backends.
///
/// `complete` covers non-streaming calls (auxiliary title/suggestion
/// generation, including JSON-object response formats); `stream` produces a
/// lazy, finite, non-restartable sequence of events for the primary turn.
///
/// Implementations live in nexus-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "openrouter").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    ///
    /// Returns a boxed stream (not RPITIT) because streams need to be
    /// object-safe for the `BoxLlmProvider` wrapper.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
