//! Messages the core emits towards clients.
//!
//! The core is payload-agnostic: relayed messages are flat string maps
//! forwarded verbatim. The only message it authors itself is the
//! [`PairingNotice`] sent after every connect.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use super::ClientId;

/// Wire-level stand-in for "no partner" / "no matched interest".
pub const NULL_SENTINEL: &str = "Null";

/// Opaque client-to-client message: string keys to string values.
pub type Payload = HashMap<String, String>;

/// Result of a connect, sent to the new client and, when paired, to its
/// partner.
///
/// Serializes as `{"id", "partnerId", "matchedInterest"}`, with absent
/// values written as [`NULL_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingNotice {
    /// Recipient's own identifier.
    pub id: ClientId,
    /// Recipient's partner, if paired.
    #[serde(serialize_with = "serialize_or_null")]
    pub partner_id: Option<ClientId>,
    /// Interest tag that produced the pairing, if interest-based.
    #[serde(serialize_with = "serialize_or_null")]
    pub matched_interest: Option<String>,
}

/// Anything written to a client's connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Registration outcome.
    Pairing(PairingNotice),
    /// Payload forwarded from the partner.
    Relay(Payload),
}

fn serialize_or_null<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<str>,
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_str(v.as_ref()),
        None => serializer.serialize_str(NULL_SENTINEL),
    }
}
