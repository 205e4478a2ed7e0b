// ── In-memory registries ──
//
// Singly owned by the adapter and handed out by reference; nothing in
// here is shared across tasks.

mod bridges;
mod locks;

pub use bridges::BridgeRegistry;
pub use locks::LockRegistry;
