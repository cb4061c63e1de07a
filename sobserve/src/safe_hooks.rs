use std::panic::{AssertUnwindSafe, catch_unwind};

use schat::{ChatError, Route, RoutingHooks};
use sprovider::{ProviderError, ProviderId};

/// Contains panics raised by an inner hook so routing never fails because of one.
pub struct SafeRoutingHooks<H> {
    inner: H,
}

impl<H> SafeRoutingHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> RoutingHooks for SafeRoutingHooks<H>
where
    H: RoutingHooks,
{
    fn on_dispatch(&self, model: &str, route: &Route, stream: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch(model, route, stream)
        }));
    }

    fn on_provider_fallback(&self, requested: &str, fallback: &ProviderId) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_provider_fallback(requested, fallback)
        }));
    }

    fn on_channel_error(&self, channel_id: i64, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_channel_error(channel_id, error)
        }));
    }

    fn on_context_fitted(&self, model: &str, kept_messages: usize, input_tokens: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_context_fitted(model, kept_messages, input_tokens)
        }));
    }

    fn on_context_rejected(&self, model: &str, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_context_rejected(model, error)
        }));
    }
}

/// Forwards every callback to each hook in order.
#[derive(Default)]
pub struct FanoutRoutingHooks {
    hooks: Vec<Box<dyn RoutingHooks>>,
}

impl FanoutRoutingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: impl RoutingHooks + 'static) -> Self {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl RoutingHooks for FanoutRoutingHooks {
    fn on_dispatch(&self, model: &str, route: &Route, stream: bool) {
        for hooks in &self.hooks {
            hooks.on_dispatch(model, route, stream);
        }
    }

    fn on_provider_fallback(&self, requested: &str, fallback: &ProviderId) {
        for hooks in &self.hooks {
            hooks.on_provider_fallback(requested, fallback);
        }
    }

    fn on_channel_error(&self, channel_id: i64, error: &ProviderError) {
        for hooks in &self.hooks {
            hooks.on_channel_error(channel_id, error);
        }
    }

    fn on_context_fitted(&self, model: &str, kept_messages: usize, input_tokens: usize) {
        for hooks in &self.hooks {
            hooks.on_context_fitted(model, kept_messages, input_tokens);
        }
    }

    fn on_context_rejected(&self, model: &str, error: &ChatError) {
        for hooks in &self.hooks {
            hooks.on_context_rejected(model, error);
        }
    }
}
