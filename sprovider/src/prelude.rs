//! Common `sprovider` imports for downstream crates.

pub use crate::{
    BackendRegistry, BoxedResponseStream, Channel, ChannelCatalog, ChatBackend, ChatRequest,
    ChatResponse, ContentPart, ImageDetail, Message, Messages, ModelCatalog, ModelDescriptor,
    ModelProvider, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ResponseStream,
    Role, SecretString, providers,
};
pub use crate::{BackendFactory, BackendFamily, HttpBackendConfig};
#[cfg(feature = "backend-openai-compatible")]
pub use crate::{HttpBackendFactory, OpenAiCompatibleBackend};
pub use scommon::{BoxFuture, MetadataMap};
