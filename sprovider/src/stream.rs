//! Streaming response contracts and in-memory stream utilities.
//!
//! ```rust
//! use sprovider::{BoxedResponseStream, ChatResponse, VecResponseStream};
//!
//! let stream = VecResponseStream::new(vec![
//!     Ok(ChatResponse::text("hello")),
//!     Ok(ChatResponse::finished("stop")),
//! ]);
//! let _boxed: BoxedResponseStream = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{ChatResponse, ProviderError};

/// Backend stream contract.
///
/// Invariants for consumers:
/// - Values are emitted in the order the backend produced them.
/// - The last value carries a finish reason, or the stream ends with an `Err`.
/// - Once the stream yields `None`, it must not yield additional items.
/// - Dropping the stream releases the underlying connection.
pub trait ResponseStream: Stream<Item = Result<ChatResponse, ProviderError>> + Send {}

impl<T> ResponseStream for T where T: Stream<Item = Result<ChatResponse, ProviderError>> + Send {}

pub type BoxedResponseStream = Pin<Box<dyn ResponseStream + 'static>>;

#[derive(Debug)]
pub struct VecResponseStream {
    items: VecDeque<Result<ChatResponse, ProviderError>>,
}

impl VecResponseStream {
    pub fn new(items: Vec<Result<ChatResponse, ProviderError>>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl Stream for VecResponseStream {
    type Item = Result<ChatResponse, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ChatResponse, ProviderError>>> {
        Poll::Ready(self.items.pop_front())
    }
}
