// ── Domain model ──
//
// Canonical adapter types: bridges, locks, and the mirrored host devices
// each lock owns.

pub mod bridge;
pub mod device;
pub mod lock;

pub use bridge::{Bridge, BridgeId};
pub use device::{DeviceRole, DeviceSpec, DeviceUnit, SelectorOptions};
pub use lock::{Lock, NukiId, lock_state};
