//! Domain layer: identifiers, sessions, wait pools and pairing.
//!
//! This module holds the matchmaking data model. None of these types lock
//! on their own; [`crate::service::ChatService`] owns them together behind
//! a single critical section.

pub mod client_id;
pub mod connection;
pub mod interests;
pub mod matchmaker;
pub mod message;
pub mod registry;
pub mod session;
pub mod wait_pools;

pub use client_id::{ClientId, SessionToken};
pub use connection::{ConnectionHandle, MessageSource};
pub use interests::parse_interests;
pub use matchmaker::{Pairing, find_partner};
pub use message::{NULL_SENTINEL, OutboundMessage, PairingNotice, Payload};
pub use registry::Registry;
pub use session::{Session, SessionState};
pub use wait_pools::WaitPools;
