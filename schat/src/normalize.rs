//! Request normalization: model-id cleanup, empty-turn filtering, per-model
//! quirks, and system-prompt handling.
//!
//! ```rust
//! use schat::{QuirkSet, initialize};
//! use sprovider::{ChatRequest, Message};
//!
//! let mut request = ChatRequest::new(
//!     "gateway:gpt-4o",
//!     vec![Message::user("  "), Message::user("hello")],
//! );
//! request.n = 42;
//!
//! let request = initialize(request, &QuirkSet::default());
//! assert_eq!(request.model, "gpt-4o");
//! assert_eq!(request.room_id, 42);
//! assert_eq!(request.n, 0);
//! assert_eq!(request.messages.len(), 1);
//! ```

use std::sync::Arc;

use serde::Deserialize;
use sprovider::{ChatRequest, Message, Messages, Role};

/// Default model that accepts exactly one turn per request.
pub const GEMINI_PRO_VISION: &str = "gemini-pro-vision";

/// A structural rewrite one model family needs before dispatch.
pub trait ModelQuirk: Send + Sync {
    fn name(&self) -> &str;

    fn applies_to(&self, model: &str) -> bool;

    fn apply(&self, messages: Messages) -> Messages;
}

/// Collapses a multi-turn conversation to its final message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleTurnQuirk {
    models: Vec<String>,
}

impl SingleTurnQuirk {
    pub fn new(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModelQuirk for SingleTurnQuirk {
    fn name(&self) -> &str {
        "single_turn"
    }

    fn applies_to(&self, model: &str) -> bool {
        self.models.iter().any(|candidate| candidate == model)
    }

    fn apply(&self, messages: Messages) -> Messages {
        let mut messages = messages.into_inner();
        if messages.len() > 1 {
            messages.drain(..messages.len() - 1);
        }
        Messages::from(messages)
    }
}

#[derive(Clone)]
pub struct QuirkSet {
    quirks: Vec<Arc<dyn ModelQuirk>>,
}

impl QuirkSet {
    pub fn empty() -> Self {
        Self { quirks: Vec::new() }
    }

    pub fn with_quirk(mut self, quirk: Arc<dyn ModelQuirk>) -> Self {
        self.quirks.push(quirk);
        self
    }

    pub fn single_turn(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::empty().with_quirk(Arc::new(SingleTurnQuirk::new(models)))
    }

    pub fn apply(&self, model: &str, mut messages: Messages) -> Messages {
        for quirk in self.quirks.iter().filter(|quirk| quirk.applies_to(model)) {
            messages = quirk.apply(messages);
        }
        messages
    }

    pub fn len(&self) -> usize {
        self.quirks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quirks.is_empty()
    }
}

impl Default for QuirkSet {
    fn default() -> Self {
        Self::single_turn([GEMINI_PRO_VISION])
    }
}

impl std::fmt::Debug for QuirkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.quirks.iter().map(|quirk| quirk.name()))
            .finish()
    }
}

/// Inbound cleanup run once per caller request.
///
/// A non-empty `temp_model` replaces `model` for this request. Not
/// idempotent: a model id such as `a:b:c` loses one namespace segment per call.
pub fn initialize(request: ChatRequest, quirks: &QuirkSet) -> ChatRequest {
    let mut request = request.migrate_legacy_room_slot();
    if let Some(temp_model) = request.temp_model.as_deref().filter(|m| !m.trim().is_empty()) {
        request.model = temp_model.trim().to_string();
    }
    request.model = strip_namespace(&request.model);

    let messages = request
        .messages
        .into_iter()
        .filter(|message| !message.is_blank())
        .collect::<Messages>();
    request.messages = quirks.apply(&request.model, messages);
    request
}

fn strip_namespace(model: &str) -> String {
    match model.split_once(':') {
        Some((_, rest)) => rest.to_string(),
        None => model.to_string(),
    }
}

/// Overwrites a leading system message, or prepends one.
pub fn replace_or_inject_system_prompt(mut request: ChatRequest, prompt: &str) -> ChatRequest {
    let mut messages = request.messages.into_inner();
    match messages.first_mut() {
        Some(first) if first.role == Role::System => first.content = prompt.to_string(),
        _ => messages.insert(0, Message::system(prompt)),
    }
    request.messages = Messages::from(messages);
    request
}

/// A whole-message phrase substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRewrite {
    pub from: String,
    pub to: String,
}

impl ContentRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A bare "continue" trips at least one upstream content filter.
    pub fn continuation() -> Self {
        Self::new("继续", "请接着说")
    }
}

/// Replaces the content of every message whose trimmed text equals a rule's `from`.
pub fn rewrite_content(messages: Messages, rewrites: &[ContentRewrite]) -> Messages {
    messages
        .into_iter()
        .map(|mut message| {
            let trimmed = message.content.trim();
            if let Some(rule) = rewrites.iter().find(|rule| rule.from == trimmed) {
                message.content = rule.to.clone();
            }
            message
        })
        .collect()
}

/// Keeps at most one system message, led by the model's mandatory prompt.
///
/// The caller's own system text follows the mandatory prompt on a new line.
/// The system message, when present, comes first.
pub fn merge_mandatory_prompt(messages: Messages, prompt: Option<&str>) -> Messages {
    let (system, chat) = messages.split_system();
    let caller = system.into_inner().into_iter().next();
    let prompt = prompt.filter(|prompt| !prompt.is_empty());

    let system = match (prompt, caller) {
        (Some(prompt), Some(mut caller)) => {
            caller.content = format!("{prompt}\n{}", caller.content);
            Some(caller)
        }
        (Some(prompt), None) => Some(Message::system(prompt)),
        (None, caller) => caller,
    };

    system.into_iter().chain(chat).collect()
}
