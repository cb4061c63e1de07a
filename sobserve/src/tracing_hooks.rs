//! Tracing-based routing hooks.

use schat::{ChatError, Route, RoutingHooks};
use sprovider::{ProviderError, ProviderId};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRoutingHooks;

impl RoutingHooks for TracingRoutingHooks {
    fn on_dispatch(&self, model: &str, route: &Route, stream: bool) {
        tracing::info!(event = "dispatch", model, route = %route, stream);
    }

    fn on_provider_fallback(&self, requested: &str, fallback: &ProviderId) {
        tracing::warn!(event = "provider_fallback", requested, fallback = %fallback);
    }

    fn on_channel_error(&self, channel_id: i64, error: &ProviderError) {
        tracing::error!(
            event = "channel_error",
            channel_id,
            error_kind = error.code(),
            error = %error
        );
    }

    fn on_context_fitted(&self, model: &str, kept_messages: usize, input_tokens: usize) {
        tracing::debug!(event = "context_fitted", model, kept_messages, input_tokens);
    }

    fn on_context_rejected(&self, model: &str, error: &ChatError) {
        tracing::info!(
            event = "context_rejected",
            model,
            error_kind = ?error.kind,
            error = %error
        );
    }
}
