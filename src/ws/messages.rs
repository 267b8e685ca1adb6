//! WebSocket wire types: connect query and inbound payload decoding.

use crate::config::GatewayConfig;
use crate::domain::{ClientId, Payload, parse_interests};
use crate::error::{GatewayError, TransportError};

/// Query string of `GET /ws`.
///
/// Built from the raw key/value pairs; a repeated key keeps its first value.
#[derive(Debug, Clone, Default)]
pub struct ConnectQuery {
    /// Caller-chosen identifier. Generated when absent or blank.
    pub id: Option<String>,
    /// Display name. Only logged.
    pub name: Option<String>,
    /// JSON-encoded array of interest tags.
    pub interests: Option<String>,
}

/// Validated connect parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Client identifier to register under.
    pub client_id: ClientId,
    /// Interest tags in supplied order.
    pub interests: Vec<String>,
}

impl FromIterator<(String, String)> for ConnectQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "id" => &mut query.id,
                "name" => &mut query.name,
                "interests" => &mut query.interests,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

impl ConnectQuery {
    /// Validates the query against `config` limits.
    ///
    /// Malformed interests are not an error: they degrade to unconditional
    /// matching.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the identifier is longer
    /// than [`GatewayConfig::max_client_id_len`] or more than
    /// [`GatewayConfig::max_interests`] tags are supplied.
    pub fn into_request(self, config: &GatewayConfig) -> Result<ConnectRequest, GatewayError> {
        let client_id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if id.chars().count() > config.max_client_id_len {
                    return Err(GatewayError::InvalidRequest(format!(
                        "client id exceeds {} characters",
                        config.max_client_id_len
                    )));
                }
                ClientId::new(id)
            }
            _ => ClientId::generate(),
        };

        let interests = parse_interests(self.interests.as_deref());
        if interests.len() > config.max_interests {
            return Err(GatewayError::InvalidRequest(format!(
                "at most {} interests allowed, got {}",
                config.max_interests,
                interests.len()
            )));
        }

        tracing::debug!(
            client_id = %client_id,
            name = self.name.as_deref().unwrap_or_default(),
            ?interests,
            "connect request"
        );

        Ok(ConnectRequest {
            client_id,
            interests,
        })
    }
}

/// Decodes an inbound text frame into a relay payload.
///
/// # Errors
///
/// Returns [`TransportError::MalformedPayload`] if the frame is not a JSON
/// object whose values are all strings.
pub fn decode_payload(text: &str) -> Result<Payload, TransportError> {
    serde_json::from_str(text).map_err(|e| TransportError::MalformedPayload(e.to_string()))
}
