// ── Runtime adapter configuration ──
//
// These types describe which bridge to talk to and how the adapter runs.
// They carry the API key but never touch disk; the binary builds an
// `AdapterConfig` from its own config layer and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Default port for the bridge HTTP API.
pub const DEFAULT_BRIDGE_PORT: u16 = 8080;
/// Default port the callback listener binds.
pub const DEFAULT_LISTEN_PORT: u16 = 5922;

/// The statically configured bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub address: String,
    pub port: u16,
    pub api_key: SecretString,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".into(),
            port: DEFAULT_BRIDGE_PORT,
            api_key: SecretString::from(String::new()),
        }
    }
}

/// Everything the adapter needs at runtime.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub bridge: BridgeConfig,
    /// Port our callback listener binds and advertises to bridges.
    pub listen_port: u16,
    /// Per-request timeout for bridge and discovery calls.
    pub timeout: Duration,
    /// Query the cloud discovery service for more bridges on start.
    pub discover: bool,
    /// Discovery endpoint.
    pub discovery_url: String,
    /// Re-list locks on every bridge this often. Zero disables it.
    pub relist_interval: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            listen_port: DEFAULT_LISTEN_PORT,
            timeout: Duration::from_secs(30),
            discover: false,
            discovery_url: nukly_api::DISCOVERY_URL.into(),
            relist_interval: Duration::ZERO,
        }
    }
}
