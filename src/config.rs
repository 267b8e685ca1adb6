//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

/// Port used when neither `LISTEN_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// Longest client-supplied identifier accepted on connect.
    pub max_client_id_len: usize,

    /// Most interest tags accepted on connect.
    pub max_interests: usize,

    /// Fixed seed for partner selection. `None` seeds from OS entropy.
    pub pairing_seed: Option<u64>,

    /// Log output format.
    pub log_format: LogFormat,

    /// Timeout applied to plain HTTP requests.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_client_id_len: 128,
            max_interests: 32,
            pairing_seed: None,
            log_format: LogFormat::Pretty,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `LISTEN_ADDR` cannot be parsed
    /// as a [`SocketAddr`], if `PORT` is not a valid port number, or if
    /// `LOG_FORMAT` names an unknown format.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                key: "LISTEN_ADDR",
                reason: format!("{e}"),
            })?,
            Err(_) => {
                let port = match std::env::var("PORT") {
                    Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                        key: "PORT",
                        reason: format!("{e}"),
                    })?,
                    Err(_) => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            None | Some("pretty") | Some("PRETTY") => LogFormat::Pretty,
            Some("json") | Some("JSON") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                });
            }
        };

        Ok(Self {
            listen_addr,
            max_client_id_len: parse_env("MAX_CLIENT_ID_LEN", defaults.max_client_id_len),
            max_interests: parse_env("MAX_INTERESTS", defaults.max_interests),
            pairing_seed: std::env::var("PAIRING_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            log_format,
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
