use thiserror::Error;

/// Top-level error type for the `nukly-api` crate.
///
/// Covers every failure mode of the bridge and discovery endpoints:
/// transport, HTTP status, and body decoding. `nukly-core` maps these
/// into adapter-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bridge rejected the API token (HTTP 401).
    #[error("Invalid API token")]
    InvalidToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to build the underlying HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Bridge API ──────────────────────────────────────────────────
    /// Non-success status from the bridge or discovery service.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
