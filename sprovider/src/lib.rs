//! Vendor-agnostic message model and backend contracts for the switchboard gateway.
//!
//! This crate owns what every backend must agree on: the conversation and
//! request types, the [`ChatBackend`] trait, streaming responses, error
//! values, the start-up [`BackendRegistry`], and the model/channel catalog
//! entities the resolver consults. The `backend-openai-compatible` feature
//! adds an HTTP backend family for OpenAI-dialect vendors and a factory that
//! builds one per configured channel.

pub mod adapters;
mod backend;
mod catalog;
mod credentials;
mod error;
mod factory;
mod model;
pub mod prelude;
mod registry;
mod stream;

pub use backend::{ChatBackend, ProviderFuture};
pub use catalog::{
    Channel, ChannelCatalog, ChannelMeta, InMemoryChannelCatalog, InMemoryModelCatalog,
    ModelCatalog, ModelDescriptor, ModelMeta, ModelProvider,
};
pub use credentials::SecretString;
pub use error::{ProviderError, ProviderErrorKind};
pub use factory::{BackendFactory, BackendFamily, HttpBackendConfig};
pub use model::{
    ChatRequest, ChatResponse, ContentPart, FileUrl, ImageDetail, ImageUrl, Message, Messages,
    Role,
};
pub use registry::{BackendRegistry, ProviderId, providers};
pub use scommon::{BoxFuture, MetadataMap};
pub use stream::{BoxedResponseStream, ResponseStream, VecResponseStream};

#[cfg(feature = "backend-openai-compatible")]
pub use adapters::openai::{HttpBackendFactory, OpenAiCompatibleBackend};
