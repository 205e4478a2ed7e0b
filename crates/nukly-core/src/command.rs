// ── Command translation ──
//
// Maps a selector level chosen in the host to the bridge action to send
// and the door state to show until the push callback confirms it.

use nukly_api::LockAction;

use crate::model::{DeviceRole, lock_state};

/// A bridge action plus the state to display optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockCommand {
    pub action: LockAction,
    pub optimistic_door_state: u8,
}

/// Translate a status selector level. `None` means "no action, just
/// re-show the current state".
pub fn translate(level: u32) -> Option<LockCommand> {
    let (action, optimistic_door_state) = match level {
        10 | 40 => (LockAction::Lock, lock_state::LOCKED),
        20 | 30 => (LockAction::Unlock, lock_state::UNLOCKED),
        50 | 70 => (LockAction::Unlatch, lock_state::UNLATCHED),
        60 => (LockAction::LockNGo, lock_state::UNLOCKED_LOCK_N_GO),
        _ => return None,
    };
    Some(LockCommand {
        action,
        optimistic_door_state,
    })
}

/// What a host command ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An action went to the bridge and the optimistic state was shown.
    Sent { action: LockAction, door_state: u8 },
    /// No action; the device was rewritten with its current state.
    Refreshed(DeviceRole),
}
