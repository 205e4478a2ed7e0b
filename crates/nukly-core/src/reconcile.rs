// ── State reconciliation ──
//
// Applies incoming lock state (a listing entry, a push callback, or an
// optimistic command result) to the in-memory lock and decides whether
// the mirrored host device needs to be rewritten.

use tracing::{debug, warn};

use nukly_api::{CallbackPayload, LockInfo};

use crate::error::CoreError;
use crate::host::DeviceHost;
use crate::model::{BridgeId, DeviceRole, Lock, NukiId};
use crate::store::LockRegistry;

/// Reconciles lock state into a host's device table.
pub struct StateReconciler<'a, H: DeviceHost> {
    host: &'a mut H,
}

impl<'a, H: DeviceHost> StateReconciler<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        Self { host }
    }

    /// Apply a door state and battery level to `lock`.
    ///
    /// Absent values keep what is stored. The status device is rewritten
    /// when `force` is set, or when its value or battery no longer match.
    /// Returns whether the device was written.
    pub fn apply_door(
        &mut self,
        lock: &mut Lock,
        door_state: Option<u8>,
        battery: Option<u8>,
        force: bool,
    ) -> Result<bool, CoreError> {
        if door_state.is_some() {
            lock.door_state = door_state;
        }
        if battery.is_some() {
            lock.battery_charge_state = battery;
        }

        let ordinal = lock.status_ordinal();
        let battery = lock.battery_charge_state;
        self.write(lock, DeviceRole::Status, ordinal, battery, force)
    }

    /// Apply a door sensor state to `lock`. Same rule as [`apply_door`],
    /// without a battery.
    ///
    /// [`apply_door`]: Self::apply_door
    pub fn apply_sensor(
        &mut self,
        lock: &mut Lock,
        sensor_state: Option<u8>,
        force: bool,
    ) -> Result<bool, CoreError> {
        if sensor_state.is_some() {
            lock.door_sensor_state = sensor_state;
        }

        let ordinal = lock.sensor_ordinal();
        self.write(lock, DeviceRole::Sensor, ordinal, None, force)
    }

    /// Wire the lock from a listing entry if needed, then apply its last
    /// known state.
    pub fn upsert_from_listing(
        &mut self,
        locks: &mut LockRegistry,
        info: &LockInfo,
        bridge: BridgeId,
    ) -> Result<(), CoreError> {
        let lock = locks.wire(NukiId(info.nuki_id), &info.name, bridge, self.host)?;
        let state = &info.last_known_state;
        self.apply_door(lock, state.state, state.battery_charge_state, false)?;
        self.apply_sensor(lock, state.door_sensor_state, false)?;
        Ok(())
    }

    /// Apply a push callback. Callbacks for locks never listed are ignored.
    pub fn apply_callback(
        &mut self,
        locks: &mut LockRegistry,
        payload: &CallbackPayload,
    ) -> Result<(), CoreError> {
        let nuki_id = NukiId(payload.nuki_id);
        let Some(lock) = locks.get_mut(nuki_id) else {
            warn!(%nuki_id, "callback for unknown lock ignored");
            return Ok(());
        };

        self.apply_door(lock, payload.state, payload.battery_charge_state, false)?;
        self.apply_sensor(lock, payload.door_sensor_state, false)?;
        Ok(())
    }

    fn write(
        &mut self,
        lock: &Lock,
        role: DeviceRole,
        ordinal: u32,
        battery: Option<u8>,
        force: bool,
    ) -> Result<bool, CoreError> {
        let unit = lock.unit(role);
        let stale = match self.host.device(unit) {
            Some(device) => device.value != ordinal || device.battery != battery,
            None => true,
        };

        if !force && !stale {
            debug!(nuki_id = %lock.nuki_id(), %role, ordinal, "device already current");
            return Ok(false);
        }

        self.host.update(unit, ordinal, battery)?;
        Ok(true)
    }
}
