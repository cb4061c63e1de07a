//! Routing lifecycle callbacks for metrics and auditing.

use std::fmt::{Display, Formatter};

use sprovider::{BackendFamily, ProviderError, ProviderId};

use crate::ChatError;

/// Where a request was routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A backend built from a configured channel.
    Channel {
        channel_id: i64,
        family: BackendFamily,
    },
    /// A preconfigured backend found by provider name.
    Provider(ProviderId),
    /// The registry default, used when nothing else matched.
    Default { requested: String },
}

impl Route {
    /// Low-cardinality label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Channel { .. } => "channel",
            Self::Provider(_) => "provider",
            Self::Default { .. } => "default",
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Channel { channel_id, family } => {
                write!(f, "channel:{channel_id}:{}", family.as_str())
            }
            Self::Provider(provider) => write!(f, "provider:{provider}"),
            Self::Default { requested } => write!(f, "default(requested={requested})"),
        }
    }
}

pub trait RoutingHooks: Send + Sync {
    fn on_dispatch(&self, _model: &str, _route: &Route, _stream: bool) {}

    fn on_provider_fallback(&self, _requested: &str, _fallback: &ProviderId) {}

    fn on_channel_error(&self, _channel_id: i64, _error: &ProviderError) {}

    fn on_context_fitted(&self, _model: &str, _kept_messages: usize, _input_tokens: usize) {}

    fn on_context_rejected(&self, _model: &str, _error: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRoutingHooks;

impl RoutingHooks for NoopRoutingHooks {}
