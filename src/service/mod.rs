//! Service layer: session lifecycle orchestration.
//!
//! [`ChatService`] registers clients, pairs them through the
//! [`super::domain::matchmaker`], relays messages between partners and
//! tears sessions down.

pub mod chat_service;

pub use chat_service::{ChatService, ChatStats, Registration, RelayOutcome, SessionView};
