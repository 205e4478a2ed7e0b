// Nuki Bridge HTTP client
//
// Wraps `reqwest::Client` with bridge-specific URL construction and token
// handling. Every endpoint is a plain `GET` with the API token passed as
// the `token` query parameter.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{CallbackEntry, CallbackList, LockAction, LockInfo};

/// Raw HTTP client for a single Nuki Bridge.
///
/// Cheap to construct from a shared `reqwest::Client`; holds no
/// connection state of its own.
#[derive(Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BridgeClient {
    /// Create a client on top of a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: SecretString) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Build the plain-HTTP base URL for a bridge at `address:port`.
    pub fn base_url_for(address: &str, port: u16) -> Result<Url, Error> {
        let host = if address.contains(':') && !address.starts_with('[') {
            format!("[{address}]")
        } else {
            address.to_owned()
        };
        Ok(Url::parse(&format!("http://{host}:{port}/"))?)
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List all locks paired with the bridge.
    ///
    /// `GET /list?token=T`
    pub async fn list_locks(&self) -> Result<Vec<LockInfo>, Error> {
        let url = self.endpoint("list", &[])?;
        debug!("listing locks");
        self.get_json(url).await
    }

    /// List registered push-callback URLs.
    ///
    /// `GET /callback/list?token=T`
    pub async fn list_callbacks(&self) -> Result<Vec<CallbackEntry>, Error> {
        let url = self.endpoint("callback/list", &[])?;
        debug!("listing callbacks");
        let list: CallbackList = self.get_json(url).await?;
        Ok(list.callbacks)
    }

    /// Register a push-callback URL. The response body is ignored.
    ///
    /// `GET /callback/add?token=T&url=U`
    pub async fn add_callback(&self, callback_url: &str) -> Result<(), Error> {
        let url = self.endpoint("callback/add", &[("url", callback_url)])?;
        debug!(callback_url, "adding callback");
        self.get_discard(url).await
    }

    /// Fire a lock action without waiting for the lock to complete it.
    ///
    /// `GET /lockAction?token=T&nowait=1&nukiId=N&action=A`
    pub async fn send_lock_action(&self, nuki_id: u64, action: LockAction) -> Result<(), Error> {
        let id = nuki_id.to_string();
        let code = action.code().to_string();
        let url = self.endpoint(
            "lockAction",
            &[("nowait", "1"), ("nukiId", &id), ("action", &code)],
        )?;
        debug!(nuki_id, %action, "sending lock action");
        self.get_discard(url).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build `{base}/{path}?token=T&{query...}`.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("token", self.token.expose_secret());
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        // The query string carries the token, so only the path is logged.
        debug!(path = url.path(), "GET");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let body = check_status(resp).await?.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    async fn get_discard(&self, url: Url) -> Result<(), Error> {
        debug!(path = url.path(), "GET");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Map non-success statuses to errors, passing successful responses through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::InvalidToken);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let preview: String = body.chars().take(200).collect();
        return Err(Error::Http {
            status: status.as_u16(),
            body: preview,
        });
    }

    Ok(resp)
}
