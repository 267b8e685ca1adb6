//! # banter-gateway
//!
//! Rendezvous service for anonymous one-to-one chat. Clients connect over
//! WebSocket, are paired either with anyone or with someone sharing an
//! interest tag, and have their messages relayed to their partner until
//! either side disconnects.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket /ws, HTTP /healthcheck)
//!     │
//!     ├── WS Handler + receive loop (ws/)
//!     ├── System routes (api/)
//!     │
//!     ├── ChatService: lifecycle + relay (service/)
//!     │       single lock over ↓
//!     ├── Registry, WaitPools, Matchmaker (domain/)
//!     │
//!     └── ConnectionHandle / MessageSource (transport seams)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;

#[cfg(test)]
mod test_support;
