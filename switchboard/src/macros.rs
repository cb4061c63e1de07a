/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use switchboard::{Role, sb_msg};
///
/// let message = sb_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! sb_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates [`Messages`](crate::Messages) from role/content pairs.
///
/// ```rust
/// use switchboard::{Role, sb_messages};
///
/// let messages = sb_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.roles(), vec![Role::System, Role::User]);
/// ```
#[macro_export]
macro_rules! sb_messages {
    () => {
        $crate::Messages::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        $crate::Messages::from(vec![$($crate::sb_msg!($role => $content)),+])
    };
}

/// Creates a [`ChatRequest`](crate::ChatRequest) for `model` from role/content pairs.
///
/// ```rust
/// use switchboard::sb_request;
///
/// let request = sb_request!("gpt-4o", user => "hello", assistant => "hi", user => "继续");
/// assert_eq!(request.model, "gpt-4o");
/// assert_eq!(request.messages.len(), 3);
/// assert!(!request.stream);
/// ```
#[macro_export]
macro_rules! sb_request {
    ($model:expr $(,)?) => {
        $crate::ChatRequest::new($model, $crate::Messages::new())
    };
    ($model:expr, $($role:ident => $content:expr),+ $(,)?) => {
        $crate::ChatRequest::new($model, $crate::sb_messages![$($role => $content),+])
    };
}
