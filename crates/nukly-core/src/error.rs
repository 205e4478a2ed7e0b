// ── Core error types ──
//
// Adapter-facing errors from nukly-core. Transport-layer failures from
// `nukly_api` are translated by the `From` impl below, so callers match on
// what went wrong rather than on HTTP details.

use thiserror::Error;

use crate::model::NukiId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Bridge communication ─────────────────────────────────────────
    #[error("Cannot reach bridge at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Bridge rejected the API token")]
    InvalidToken,

    #[error("Bridge request timed out")]
    Timeout,

    #[error("Bridge API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Logical misses ───────────────────────────────────────────────
    #[error("Unknown lock: {nuki_id}")]
    UnknownLock { nuki_id: NukiId },

    #[error("Unknown bridge: {id}")]
    UnknownBridge { id: u64 },

    #[error("Unknown host device unit {unit}")]
    UnknownDevice { unit: u32 },

    // ── Local plumbing ───────────────────────────────────────────────
    #[error("Cannot determine local address towards {target}: {reason}")]
    LocalAddress { target: String, reason: String },

    #[error("Callback listener failed: {0}")]
    Listener(#[source] std::io::Error),

    #[error("Malformed callback payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Host device store error: {message}")]
    Host { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nukly_api::Error> for CoreError {
    fn from(err: nukly_api::Error) -> Self {
        match err {
            nukly_api::Error::InvalidToken => CoreError::InvalidToken,
            nukly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nukly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid bridge URL: {e}"),
            },
            nukly_api::Error::Tls(message) => CoreError::Config { message },
            nukly_api::Error::Http { status, body } => CoreError::Api {
                message: body,
                status: Some(status),
            },
            nukly_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
