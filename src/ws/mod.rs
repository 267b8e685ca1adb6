//! WebSocket layer: the transport side of matchmaking.
//!
//! The endpoint at `/ws` upgrades the connection, registers the client with
//! the [`crate::service::ChatService`] and relays its messages to its
//! partner until either side disconnects.

pub mod connection;
pub mod handler;
pub mod messages;
