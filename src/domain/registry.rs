//! Authoritative client-id → session mapping.
//!
//! [`Registry`] is a plain map. It has no lock of its own: the
//! [`crate::service::ChatService`] holds it, the wait pools and the pairing
//! RNG behind one mutex so every multi-step operation (lookup + mutation)
//! is observed atomically by other tasks.

use std::collections::HashMap;

use super::{ClientId, Session};

/// Sessions keyed by client identifier.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ClientId, Session>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `session`, returning any session previously stored under
    /// the same identifier.
    ///
    /// Callers replacing a live session must tear it down first; see
    /// [`crate::service::ChatService::connect`].
    pub fn insert(&mut self, session: Session) -> Option<Session> {
        self.sessions.insert(session.id.clone(), session)
    }

    /// Returns the session for `id`.
    #[must_use]
    pub fn get(&self, id: &ClientId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Returns the session for `id` mutably.
    pub fn get_mut(&mut self, id: &ClientId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Removes and returns the session for `id`.
    pub fn remove(&mut self, id: &ClientId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Iterates over all live sessions.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
