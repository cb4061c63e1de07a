//! The chat-capable backend contract shared by vendor clients and the gateway facade.

use scommon::BoxFuture;

use crate::{BoxedResponseStream, ChatRequest, ChatResponse, ProviderError};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

/// A backend that can answer chat requests.
///
/// Implementations must not reorder streamed values, and dropping a returned
/// stream must cancel the underlying call.
pub trait ChatBackend: Send + Sync {
    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>>;

    fn chat_stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>>;

    /// Maximum input context for `model`, or `0` when the backend does not know.
    fn max_context_length<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, usize>;
}
