//! OpenAI chat-completions dialect, shared by OpenAI, Azure, OneAPI and OpenRouter channels.

mod backend;
mod factory;
mod serde_api;
mod tests;
mod transport;
mod types;

pub use backend::{OpenAiCompatibleBackend, known_context_window};
pub use factory::HttpBackendFactory;
pub use transport::{OpenAiChunkStream, OpenAiHttpTransport, OpenAiTransport};
pub use types::{
    OpenAiAuth, OpenAiContent, OpenAiEndpoint, OpenAiMessage, OpenAiPart, OpenAiRequest,
    OpenAiResponse, OpenAiStreamChunk, OpenAiUsage,
};
