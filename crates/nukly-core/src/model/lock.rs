// ── Lock domain types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bridge::BridgeId;
use super::device::{DeviceRole, DeviceUnit};

/// Stable identifier of a physical lock, issued by the bridge.
///
/// Its decimal text form is the persisted host device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NukiId(pub u64);

impl fmt::Display for NukiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NukiId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for NukiId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Nuki lock state codes, as reported in `state`.
pub mod lock_state {
    pub const UNCALIBRATED: u8 = 0;
    pub const LOCKED: u8 = 1;
    pub const UNLOCKING: u8 = 2;
    pub const UNLOCKED: u8 = 3;
    pub const LOCKING: u8 = 4;
    pub const UNLATCHED: u8 = 5;
    pub const UNLOCKED_LOCK_N_GO: u8 = 6;
    pub const UNLATCHING: u8 = 7;
    pub const MOTOR_BLOCKED: u8 = 254;
    pub const UNDEFINED: u8 = 255;
}

/// A lock mirrored into the host.
///
/// State axes are `None` until the first report for that axis arrives.
/// Only the reconciler mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lock {
    nuki_id: NukiId,
    name: String,
    pub(crate) door_state: Option<u8>,
    pub(crate) door_sensor_state: Option<u8>,
    pub(crate) battery_charge_state: Option<u8>,
    pub(crate) bridge: BridgeId,
    status_unit: DeviceUnit,
    sensor_unit: DeviceUnit,
}

impl Lock {
    pub(crate) fn new(
        nuki_id: NukiId,
        name: String,
        bridge: BridgeId,
        status_unit: DeviceUnit,
        sensor_unit: DeviceUnit,
    ) -> Self {
        Self {
            nuki_id,
            name,
            door_state: None,
            door_sensor_state: None,
            battery_charge_state: None,
            bridge,
            status_unit,
            sensor_unit,
        }
    }

    pub fn nuki_id(&self) -> NukiId {
        self.nuki_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn door_state(&self) -> Option<u8> {
        self.door_state
    }

    pub fn door_sensor_state(&self) -> Option<u8> {
        self.door_sensor_state
    }

    pub fn battery_charge_state(&self) -> Option<u8> {
        self.battery_charge_state
    }

    /// The bridge that most recently listed this lock.
    pub fn bridge(&self) -> BridgeId {
        self.bridge
    }

    /// Host handle of the mirrored device for `role`.
    pub fn unit(&self, role: DeviceRole) -> DeviceUnit {
        match role {
            DeviceRole::Status => self.status_unit,
            DeviceRole::Sensor => self.sensor_unit,
        }
    }

    /// Selector ordinal the status device should display.
    pub fn status_ordinal(&self) -> u32 {
        DeviceRole::Status.ordinal(self.door_state)
    }

    /// Selector ordinal the sensor device should display.
    pub fn sensor_ordinal(&self) -> u32 {
        DeviceRole::Sensor.ordinal(self.door_sensor_state)
    }
}
