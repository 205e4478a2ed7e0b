// Nuki cloud bridge discovery
//
// `GET https://api.nuki.io/discover/bridges` lists the bridges that
// announced themselves from the caller's public address.

use tracing::debug;
use url::Url;

use crate::bridge::check_status;
use crate::error::Error;
use crate::models::{DiscoveredBridge, DiscoveryResponse};

/// Public discovery endpoint.
pub const DISCOVERY_URL: &str = "https://api.nuki.io/discover/bridges";

/// Client for the bridge discovery service.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    url: Url,
}

impl DiscoveryClient {
    /// Client against `url`, normally [`DISCOVERY_URL`].
    pub fn with_client(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    /// Fetch announced bridges. A missing `bridges` key is an empty list.
    pub async fn discover(&self) -> Result<Vec<DiscoveredBridge>, Error> {
        debug!(url = %self.url, "discovering bridges");
        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(Error::Transport)?;
        let body = check_status(resp)
            .await?
            .text()
            .await
            .map_err(Error::Transport)?;

        let parsed: DiscoveryResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if let Some(code) = parsed.error_code.filter(|c| *c != 0) {
            debug!(code, "discovery service reported an error code");
        }
        Ok(parsed.bridges)
    }
}
