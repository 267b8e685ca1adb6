//! Live state of one connected client.

use chrono::{DateTime, Utc};

use super::{ClientId, ConnectionHandle, SessionToken};

/// Matchmaking state of a registered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Sitting in one or more wait pools.
    Waiting,
    /// Paired with a partner; in no wait pool.
    Paired,
}

/// Session of one connected, identified client.
///
/// Owns the client's [`ConnectionHandle`] exclusively. Dropping the session
/// drops the handle, which ends the client's receive loop.
#[derive(Debug)]
pub struct Session {
    /// Client identifier (registry key).
    pub id: ClientId,

    /// Stamp of this particular registration.
    pub token: SessionToken,

    /// Outbound half of the client's connection.
    pub handle: Box<dyn ConnectionHandle>,

    /// Current partner, if paired.
    pub partner: Option<ClientId>,

    /// Interest tags in the order the client supplied them. Empty means
    /// unconditional matching.
    pub interests: Vec<String>,

    /// Tag that produced the pairing, if it was interest-based.
    pub matched_interest: Option<String>,

    /// Registration timestamp.
    pub connected_at: DateTime<Utc>,
}

impl Session {
    /// Creates an unpaired session.
    #[must_use]
    pub fn new(
        id: ClientId,
        token: SessionToken,
        handle: Box<dyn ConnectionHandle>,
        interests: Vec<String>,
    ) -> Self {
        Self {
            id,
            token,
            handle,
            partner: None,
            interests,
            matched_interest: None,
            connected_at: Utc::now(),
        }
    }

    /// Returns the matchmaking state derived from the partner field.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.partner.is_some() {
            SessionState::Paired
        } else {
            SessionState::Waiting
        }
    }

    /// Returns `true` if the session matches by interest tags.
    #[must_use]
    pub fn has_interests(&self) -> bool {
        !self.interests.is_empty()
    }
}
