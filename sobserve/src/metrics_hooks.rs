//! Metrics-based routing hooks.
//!
//! ```rust
//! use schat::RoutingHooks;
//! use sobserve::MetricsRoutingHooks;
//!
//! fn accepts_routing_hooks(_hooks: &dyn RoutingHooks) {}
//!
//! let hooks = MetricsRoutingHooks;
//! accepts_routing_hooks(&hooks);
//! ```

use schat::{ChatError, Route, RoutingHooks};
use sprovider::{ProviderError, ProviderId};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRoutingHooks;

impl RoutingHooks for MetricsRoutingHooks {
    fn on_dispatch(&self, _model: &str, route: &Route, stream: bool) {
        metrics::counter!(
            "switchboard_dispatch_total",
            "route" => route.kind(),
            "stream" => if stream { "true" } else { "false" }
        )
        .increment(1);
    }

    // Requested names come from catalog data; they are logged, not used as labels.
    fn on_provider_fallback(&self, _requested: &str, fallback: &ProviderId) {
        metrics::counter!(
            "switchboard_provider_fallback_total",
            "fallback" => fallback.to_string()
        )
        .increment(1);
    }

    fn on_channel_error(&self, _channel_id: i64, error: &ProviderError) {
        metrics::counter!(
            "switchboard_channel_error_total",
            "error_kind" => error.code()
        )
        .increment(1);
    }

    fn on_context_fitted(&self, _model: &str, kept_messages: usize, input_tokens: usize) {
        metrics::histogram!("switchboard_context_messages").record(kept_messages as f64);
        metrics::histogram!("switchboard_context_input_tokens").record(input_tokens as f64);
    }

    fn on_context_rejected(&self, _model: &str, error: &ChatError) {
        metrics::counter!(
            "switchboard_context_rejected_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
