//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nukly_config::ConfigError;
use nukly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(nukly::connection_failed),
        help(
            "Check that the bridge is powered and its HTTP API is enabled.\n\
             Try: nukly locks --address <bridge-ip> --port 8080"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(code(nukly::timeout), help("Raise `timeout` in the config file."))]
    Timeout,

    #[error("Cannot serve callbacks")]
    #[diagnostic(
        code(nukly::listener),
        help("Another process may hold the port. Pick one with --listen-port.")
    )]
    Listener {
        #[source]
        source: std::io::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Bridge rejected the API token")]
    #[diagnostic(
        code(nukly::auth_failed),
        help("Copy the token from the Nuki app (Manage Bridge > HTTP API).")
    )]
    AuthFailed,

    #[error("No API token configured")]
    #[diagnostic(
        code(nukly::no_credentials),
        help(
            "Set bridge.api_key or bridge.api_key_env in {path},\n\
             or pass --api-key / set NUKLY_API_KEY."
        )
    )]
    NoCredentials { path: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nukly::not_found),
        help("Run `nukly {list_command}` to see what is available.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Input & API ──────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(nukly::validation))]
    Validation { field: String, reason: String },

    #[error("Bridge API error{}: {message}", status_suffix(.status))]
    #[diagnostic(code(nukly::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("Device store error: {message}")]
    #[diagnostic(code(nukly::host))]
    Host { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(nukly::config))]
    Config { message: String },

    // ── Plumbing ─────────────────────────────────────────────────────
    #[error("JSON error: {0}")]
    #[diagnostic(code(nukly::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    #[diagnostic(code(nukly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::LocalAddress { target, reason } => CliError::ConnectionFailed {
                url: target,
                source: reason.into(),
            },

            CoreError::InvalidToken => CliError::AuthFailed,

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::UnknownLock { nuki_id } => CliError::NotFound {
                resource_type: "lock".into(),
                identifier: nuki_id.to_string(),
                list_command: "locks".into(),
            },

            CoreError::UnknownBridge { id } => CliError::NotFound {
                resource_type: "bridge".into(),
                identifier: id.to_string(),
                list_command: "discover".into(),
            },

            CoreError::UnknownDevice { unit } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: unit.to_string(),
                list_command: "locks".into(),
            },

            CoreError::Listener(source) => CliError::Listener { source },

            CoreError::Payload(e) => CliError::Json(e),

            CoreError::Host { message } => CliError::Host { message },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => CliError::NoCredentials {
                path: nukly_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
