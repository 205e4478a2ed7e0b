//! Configuration for the nukly adapter.
//!
//! TOML file + `NUKLY_`-prefixed environment, API key resolution
//! (env + plaintext), and translation to `nukly_core::AdapterConfig`.
//! The binary layers its command-line overrides on top.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nukly_core::{AdapterConfig, BridgeConfig, DEFAULT_BRIDGE_PORT, DEFAULT_LISTEN_PORT};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for the bridge")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Log level ───────────────────────────────────────────────────────

/// Host-facing verbosity. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    Off,
    #[default]
    Error,
    Debug,
}

impl LogLevel {
    /// Directive for a `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "debug" => Ok(Self::Debug),
            other => Err(ConfigError::Validation {
                field: "log_level".into(),
                reason: format!("expected 'off', 'error', or 'debug', got '{other}'"),
            }),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// The statically configured bridge.
    #[serde(default)]
    pub bridge: BridgeSection,

    /// Port the callback listener binds.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Ask the cloud discovery service for more bridges on start.
    #[serde(default)]
    pub discover: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between periodic relists. 0 disables them.
    #[serde(default)]
    pub relist_interval: u64,

    /// JSON file backing the device table. Defaults under the data dir.
    pub device_store: Option<PathBuf>,

    /// Bridge discovery endpoint, if not the public Nuki one.
    pub discovery_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge: BridgeSection::default(),
            listen_port: default_listen_port(),
            log_level: LogLevel::default(),
            discover: false,
            timeout: default_timeout(),
            relist_interval: 0,
            device_store: None,
            discovery_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeSection {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_bridge_port")]
    pub port: u16,

    /// API token in plaintext. `api_key_env` takes precedence.
    pub api_key: Option<String>,

    /// Environment variable holding the API token.
    pub api_key_env: Option<String>,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_bridge_port(),
            api_key: None,
            api_key_env: None,
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".into()
}
fn default_bridge_port() -> u16 {
    DEFAULT_BRIDGE_PORT
}
fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Render as TOML with the plaintext API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.bridge.api_key.is_some() {
            shown.bridge.api_key = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Device store path, falling back to the platform data dir.
    pub fn device_store_path(&self) -> PathBuf {
        self.device_store.clone().unwrap_or_else(default_device_store)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "nukly", "nukly")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the persisted device table.
pub fn default_device_store() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share").join("devices.json"),
        |dirs| dirs.data_dir().join("devices.json"),
    )
}

fn home_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("nukly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    from_figment(
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("NUKLY_").split("__")),
    )
}

/// Extract a [`Config`] from arbitrary providers layered over defaults.
pub fn from_figment(layers: Figment) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(layers)
        .extract()?;
    Ok(config)
}

// ── Credentials & translation ───────────────────────────────────────

/// Resolve the bridge API key: `api_key_env` first, then plaintext.
pub fn resolve_api_key(bridge: &BridgeSection) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = bridge.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    match bridge.api_key {
        Some(ref key) if !key.is_empty() => Ok(SecretString::from(key.clone())),
        _ => Err(ConfigError::NoCredentials),
    }
}

/// Build the runtime adapter config.
pub fn to_adapter_config(cfg: &Config, api_key: SecretString) -> AdapterConfig {
    let defaults = AdapterConfig::default();
    AdapterConfig {
        bridge: BridgeConfig {
            address: cfg.bridge.address.clone(),
            port: cfg.bridge.port,
            api_key,
        },
        listen_port: cfg.listen_port,
        timeout: Duration::from_secs(cfg.timeout),
        discover: cfg.discover,
        relist_interval: Duration::from_secs(cfg.relist_interval),
        discovery_url: cfg
            .discovery_url
            .clone()
            .unwrap_or(defaults.discovery_url),
        ..defaults
    }
}
