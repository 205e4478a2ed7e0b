// nukly-core: Lock registry, state reconciliation, and host wiring between
// nukly-api and a home-automation host.

pub mod adapter;
pub mod callback;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod listener;
pub mod model;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::Adapter;
pub use callback::{CallbackOutcome, CallbackRegistrar, callback_url, local_address_towards};
pub use command::{CommandOutcome, LockCommand, translate};
pub use config::{AdapterConfig, BridgeConfig, DEFAULT_BRIDGE_PORT, DEFAULT_LISTEN_PORT};
pub use error::CoreError;
pub use host::{DeviceHost, HostDevice, MemoryDeviceStore};
pub use reconcile::StateReconciler;
pub use store::{BridgeRegistry, LockRegistry};

pub use model::{
    Bridge, BridgeId, DeviceRole, DeviceSpec, DeviceUnit, Lock, NukiId, SelectorOptions,
    lock_state,
};

// Wire types callers need alongside the adapter.
pub use nukly_api::{CallbackPayload, DiscoveredBridge, LockAction, LockInfo};
