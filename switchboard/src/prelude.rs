//! Common imports for most switchboard deployments.

pub use crate::{
    assistant_message, chat_service, default_hooks, image_message, parse_provider_id, request,
    streaming_request, system_message, user_message,
};
#[cfg(feature = "backend-openai-compatible")]
pub use crate::{HttpBackendFactory, build_gateway, build_registry, gateway_from_json};
pub use crate::{sb_messages, sb_msg, sb_request};
pub use crate::{
    BackendPoolEntry, BackendRegistry, BoxFuture, Channel, ChatBackend, ChatError, ChatErrorKind,
    ChatRequest, ChatResponse, ChatService, ChatServiceBuilder, ContentPart, FittedRequest,
    GatewayConfig, Message, Messages, ModelDescriptor, ModelProvider, ProviderError, ProviderId,
    Role, RoutingHooks, SwitchboardConfig, providers,
};
