//! Transport seams used by the core.
//!
//! The core never touches sockets. It writes through a [`ConnectionHandle`]
//! owned by the client's session and reads through a [`MessageSource`]
//! owned by that client's receive loop.

use std::fmt;
use std::future::Future;

use super::{OutboundMessage, Payload};
use crate::error::TransportError;

/// Outbound half of a client connection.
///
/// Implementations must not block: [`send`](Self::send) enqueues and
/// returns, because it is called while the chat state lock is held.
pub trait ConnectionHandle: Send + Sync + fmt::Debug {
    /// Queues a message for delivery to the client.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the connection can no longer accept
    /// messages.
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Closes the connection. Idempotent; never fails.
    fn close(&self);
}

/// Inbound half of a client connection.
pub trait MessageSource: Send {
    /// Waits for the next payload from the client.
    ///
    /// Resolves with an error once the stream ends for any reason, including
    /// a local [`ConnectionHandle::close`].
    fn next_message(&mut self) -> impl Future<Output = Result<Payload, TransportError>> + Send;
}
