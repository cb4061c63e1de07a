//! Production-friendly observability hooks for gateway routing.
//!
//! ```rust
//! use sobserve::{FanoutRoutingHooks, MetricsRoutingHooks, SafeRoutingHooks, TracingRoutingHooks};
//!
//! let hooks = FanoutRoutingHooks::new()
//!     .with(SafeRoutingHooks::new(TracingRoutingHooks))
//!     .with(SafeRoutingHooks::new(MetricsRoutingHooks));
//! assert_eq!(hooks.len(), 2);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsRoutingHooks;
pub use safe_hooks::{FanoutRoutingHooks, SafeRoutingHooks};
pub use tracing_hooks::TracingRoutingHooks;

pub mod prelude {
    pub use crate::{
        FanoutRoutingHooks, MetricsRoutingHooks, SafeRoutingHooks, TracingRoutingHooks,
    };
}
