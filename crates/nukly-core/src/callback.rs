// ── Callback registration ──
//
// Each bridge must push state changes to exactly one URL pointing back at
// this adapter's listener. The URL uses whichever local address the OS
// would route towards the bridge.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;
use tracing::{debug, info};

use nukly_api::BridgeClient;

use crate::error::CoreError;
use crate::model::Bridge;

/// Result of [`CallbackRegistrar::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    AlreadyRegistered { url: String },
    Registered { url: String },
}

impl CallbackOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::AlreadyRegistered { url } | Self::Registered { url } => url,
        }
    }
}

/// Registers this adapter's callback URL with bridges.
#[derive(Debug, Clone, Copy)]
pub struct CallbackRegistrar {
    listen_port: u16,
}

impl CallbackRegistrar {
    pub fn new(listen_port: u16) -> Self {
        Self { listen_port }
    }

    /// Make sure `bridge` has our callback URL registered, adding it only
    /// when no existing entry matches exactly.
    pub async fn ensure(
        &self,
        bridge: &Bridge,
        client: &BridgeClient,
    ) -> Result<CallbackOutcome, CoreError> {
        let local = local_address_towards(bridge.address(), bridge.port()).await?;
        let url = callback_url(local, self.listen_port);

        let existing = client.list_callbacks().await?;
        if existing.iter().any(|cb| cb.url == url) {
            debug!(bridge = %bridge.id(), %url, "callback already registered");
            return Ok(CallbackOutcome::AlreadyRegistered { url });
        }

        client.add_callback(&url).await?;
        info!(bridge = %bridge.id(), %url, "registered callback");
        Ok(CallbackOutcome::Registered { url })
    }
}

/// `http://<ip>:<port>`, with IPv6 addresses bracketed.
pub fn callback_url(ip: IpAddr, port: u16) -> String {
    format!("http://{}", SocketAddr::new(ip, port))
}

/// The local address the OS would use to reach `host:port`.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub async fn local_address_towards(host: &str, port: u16) -> Result<IpAddr, CoreError> {
    let fail = |reason: String| CoreError::LocalAddress {
        target: format!("{host}:{port}"),
        reason,
    };

    let remote = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| fail(e.to_string()))?
        .next()
        .ok_or_else(|| fail("no address resolved".into()))?;

    let bind: SocketAddr = match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind).await.map_err(|e| fail(e.to_string()))?;
    socket
        .connect(remote)
        .await
        .map_err(|e| fail(e.to_string()))?;
    let local = socket.local_addr().map_err(|e| fail(e.to_string()))?;
    Ok(local.ip())
}
