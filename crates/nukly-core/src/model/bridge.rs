// ── Bridge domain types ──

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use nukly_api::BridgeClient;

use crate::error::CoreError;

/// Identifier of a bridge in the registry.
///
/// The bridge from static configuration is always [`BridgeId::CONFIGURED`];
/// discovered bridges use the id announced by the discovery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BridgeId(pub u64);

impl BridgeId {
    pub const CONFIGURED: Self = Self(0);
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Nuki Bridge endpoint. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Bridge {
    id: BridgeId,
    address: String,
    port: u16,
    api_key: SecretString,
    base_url: Url,
}

impl Bridge {
    pub fn new(
        id: BridgeId,
        address: impl Into<String>,
        port: u16,
        api_key: SecretString,
    ) -> Result<Self, CoreError> {
        let address = address.into();
        let base_url = BridgeClient::base_url_for(&address, port)?;
        Ok(Self {
            id,
            address,
            port,
            api_key,
            base_url,
        })
    }

    pub fn id(&self) -> BridgeId {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether this bridge lives at `address:port`.
    pub fn is_at(&self, address: &str, port: u16) -> bool {
        self.address == address && self.port == port
    }

    /// A client for this bridge sharing `http`'s connection pool.
    pub fn client(&self, http: &reqwest::Client) -> BridgeClient {
        BridgeClient::with_client(http.clone(), self.base_url.clone(), self.api_key.clone())
    }
}
