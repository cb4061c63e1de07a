//! Strict user/assistant alternation required by chat-completion backends.
//!
//! ```rust
//! use schat::fix;
//! use sprovider::{Message, Messages, Role};
//!
//! let fixed = fix(Messages::from(vec![
//!     Message::user("hi"),
//!     Message::user("are you there?"),
//!     Message::assistant("yes"),
//! ]));
//!
//! assert_eq!(fixed.roles(), vec![Role::User, Role::Assistant, Role::User]);
//! assert_eq!(fixed[0].content, "are you there?");
//! ```

use sprovider::{Message, Messages, Role};

/// Synthetic user turn appended when a conversation does not end on the user.
pub const CONTINUATION_PROMPT: &str = "继续";

/// Enforces the alternation invariants.
///
/// After `fix`, at most one leading block of system messages is followed by
/// turns alternating `user, assistant, ...` that start and end on `user`.
/// Runs of same-role turns collapse to their most recent message. Empty
/// input becomes a single continuation turn.
pub fn fix(messages: Messages) -> Messages {
    let mut messages = messages.into_inner();
    if messages.last().is_none_or(|last| last.role != Role::User) {
        messages.push(Message::user(CONTINUATION_PROMPT));
    }

    let (system, chat) = Messages::from(messages).split_system();

    let mut kept = Vec::<Message>::new();
    for message in chat.into_inner().into_iter().rev() {
        if kept.last().is_some_and(|previous| previous.role == message.role) {
            continue;
        }
        kept.push(message);
    }

    // `kept` runs newest-first and starts on a user turn; an even length ends on assistant.
    if kept.len() % 2 == 0 {
        kept.pop();
    }
    kept.reverse();

    system.into_iter().chain(kept).collect()
}
