//! Unified facade over the switchboard workspace crates.
//!
//! This crate is designed to be the single dependency for most gateway
//! deployments. It re-exports the message model, the routing service, and the
//! observability hooks, and provides wiring helpers and macros for common
//! setup and request-building flows.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use schat;
pub use scommon;
pub use sobserve;
pub use sprovider;

pub use schat::{
    CONTINUATION_PROMPT, ChatError, ChatErrorKind, ChatService, ChatServiceBuilder,
    ContentRewrite, ContextFitter, ContextReducer, FittedRequest, GatewayConfig, MessageLimits,
    ModelQuirk, NoopRoutingHooks, ProviderResolver, QuirkSet, ReducedContext, ResolvedBackend,
    Route, RoutingHooks, SingleTurnQuirk, TiktokenTokenizer, TokenBudgetReducer, Tokenizer, fix,
    initialize, merge_mandatory_prompt, replace_or_inject_system_prompt, rewrite_content,
};
pub use scommon::{BoxFuture, MetadataMap};
pub use sobserve::{FanoutRoutingHooks, MetricsRoutingHooks, SafeRoutingHooks, TracingRoutingHooks};
pub use sprovider::{
    BackendFactory, BackendFamily, BackendRegistry, BoxedResponseStream, Channel, ChannelCatalog,
    ChannelMeta, ChatBackend, ChatRequest, ChatResponse, ContentPart, FileUrl,
    HttpBackendConfig, ImageDetail, ImageUrl, InMemoryChannelCatalog, InMemoryModelCatalog,
    Message, Messages, ModelCatalog, ModelDescriptor, ModelMeta, ModelProvider, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, ResponseStream, Role, SecretString,
    VecResponseStream, providers,
};
#[cfg(feature = "backend-openai-compatible")]
pub use sprovider::{HttpBackendFactory, OpenAiCompatibleBackend};

pub use runtime::{BackendPoolEntry, SwitchboardConfig, chat_service, default_hooks};
#[cfg(feature = "backend-openai-compatible")]
pub use runtime::{build_gateway, build_registry, gateway_from_json};
pub use util::{
    assistant_message, image_message, parse_provider_id, request, streaming_request,
    system_message, user_message,
};
