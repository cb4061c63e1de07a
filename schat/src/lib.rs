//! Request normalization, context fitting, and provider routing for the gateway.

mod alternation;
mod config;
mod error;
mod fitter;
mod hooks;
mod normalize;
mod resolver;
mod service;
mod tokens;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatService, ChatServiceBuilder, ContextFitter, FittedRequest,
        GatewayConfig, MessageLimits, NoopRoutingHooks, ProviderResolver, ResolvedBackend, Route,
        RoutingHooks, TiktokenTokenizer, Tokenizer,
    };
    pub use sprovider::{ChatBackend, ChatRequest, ChatResponse, Message, Messages, Role};
}

pub use alternation::{CONTINUATION_PROMPT, fix};
pub use config::GatewayConfig;
pub use error::{ChatError, ChatErrorKind};
pub use fitter::{ContextFitter, FittedRequest, MessageLimits};
pub use hooks::{NoopRoutingHooks, Route, RoutingHooks};
pub use normalize::{
    ContentRewrite, GEMINI_PRO_VISION, ModelQuirk, QuirkSet, SingleTurnQuirk, initialize,
    merge_mandatory_prompt, replace_or_inject_system_prompt, rewrite_content,
};
pub use resolver::{ProviderResolver, ResolvedBackend};
pub use service::{ChatService, ChatServiceBuilder};
pub use tokens::{
    ContextReducer, HIGH_DETAIL_IMAGE_TOKENS, LOW_DETAIL_IMAGE_TOKENS, MESSAGE_OVERHEAD_TOKENS,
    REPLY_PRIMER_TOKENS, ReducedContext, TiktokenTokenizer, TokenBudgetReducer, Tokenizer,
    image_tokens,
};
