// nukly-api: Async Rust client for the Nuki Bridge HTTP API

pub mod bridge;
pub mod discovery;
pub mod error;
pub mod models;
pub mod transport;

pub use bridge::BridgeClient;
pub use discovery::{DISCOVERY_URL, DiscoveryClient};
pub use error::Error;
pub use models::{
    CallbackEntry, CallbackList, CallbackPayload, DiscoveredBridge, DiscoveryResponse,
    LastKnownState, LockAction, LockInfo,
};
pub use transport::TransportConfig;
