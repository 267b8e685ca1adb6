//! Client and session identifiers.
//!
//! [`ClientId`] is the caller-chosen (or generated) string a client is known
//! by. [`SessionToken`] stamps one particular registration of that identifier
//! so a reconnect can be told apart from the connection it replaced.

use std::fmt;

use serde::Serialize;

/// Identifier of a connected client.
///
/// Supplied by the client on connect; a UUID v4 string is generated when
/// none is given. At most one live session exists per `ClientId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Wraps a caller-chosen identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh globally-unique identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stamp identifying one registration of a [`ClientId`].
///
/// Teardown requested by a receive loop carries the token it was handed at
/// registration; a token that no longer matches the registry means the
/// session was already replaced and nothing is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(uuid::Uuid);

impl SessionToken {
    /// Creates a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}
