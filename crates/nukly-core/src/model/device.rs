// ── Mirrored device types ──
//
// Every lock is shown in the host as two selector switches: the lock
// status (unit slot 1) and the read-only door sensor (unit slot 2).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

use super::lock::{NukiId, lock_state};

/// Host device type code for a general switch.
pub const DEVICE_TYPE_GENERAL_SWITCH: u8 = 244;
/// Host subtype code for a switch.
pub const SUBTYPE_SWITCH: u8 = 62;
/// Host switch type code for a selector switch.
pub const SWITCH_TYPE_SELECTOR: u8 = 18;

/// Distance between two selector levels.
pub const LEVEL_STEP: u32 = 10;

const STATUS_LEVELS: &[&str] = &[
    "uncalibrated",
    "locked",
    "unlocking",
    "unlocked",
    "locking",
    "unlatched",
    "unlocked (lock ‘n’ go)",
    "unlatching",
    "motor blocked",
    "Unknown",
];

const SENSOR_LEVELS: &[&str] = &[
    "-",
    "deactivated",
    "door closed",
    "door opened",
    "unknown",
    "calibrating",
    "uncalibrated",
    "removed",
];

/// Handle of a device inside the host's device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceUnit(pub u32);

impl fmt::Display for DeviceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of a lock's two mirrored devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Status,
    Sensor,
}

impl DeviceRole {
    /// Fixed per-lock slot number.
    pub fn slot(self) -> u8 {
        match self {
            Self::Status => 1,
            Self::Sensor => 2,
        }
    }

    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(Self::Status),
            2 => Some(Self::Sensor),
            _ => None,
        }
    }

    /// Highest selectable level.
    pub fn max_ordinal(self) -> u32 {
        match self {
            Self::Status => 90,
            Self::Sensor => 70,
        }
    }

    /// Selector level for a state value; unknown displays as the top level.
    pub fn ordinal(self, state: Option<u8>) -> u32 {
        let state = state.unwrap_or(lock_state::UNDEFINED);
        (u32::from(state) * LEVEL_STEP).min(self.max_ordinal())
    }

    pub fn level_names(self) -> &'static [&'static str] {
        match self {
            Self::Status => STATUS_LEVELS,
            Self::Sensor => SENSOR_LEVELS,
        }
    }

    /// Label shown for `ordinal`.
    pub fn label(self, ordinal: u32) -> &'static str {
        let names = self.level_names();
        usize::try_from(ordinal / LEVEL_STEP)
            .ok()
            .and_then(|idx| names.get(idx))
            .copied()
            .unwrap_or("Unknown")
    }

    /// Whether the host may drive this device.
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Sensor)
    }

    pub fn device_name(self, lock_name: &str) -> String {
        match self {
            Self::Status => lock_name.to_owned(),
            Self::Sensor => format!("{lock_name} Sensor"),
        }
    }

    /// Creation spec for this role's device on lock `nuki_id`.
    pub fn spec(self, nuki_id: NukiId, lock_name: &str) -> DeviceSpec {
        DeviceSpec {
            device_id: nuki_id.to_string(),
            slot: self.slot(),
            name: self.device_name(lock_name),
            device_type: DEVICE_TYPE_GENERAL_SWITCH,
            subtype: SUBTYPE_SWITCH,
            switch_type: SWITCH_TYPE_SELECTOR,
            options: SelectorOptions::for_levels(self.level_names()).into_map(),
        }
    }
}

/// Selector switch presentation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOptions {
    pub level_actions: String,
    pub level_names: Vec<String>,
    pub level_off_hidden: bool,
    pub selector_style: u8,
}

impl SelectorOptions {
    pub fn for_levels(names: &[&str]) -> Self {
        Self {
            level_actions: "|||||".into(),
            level_names: names.iter().map(|n| (*n).to_owned()).collect(),
            level_off_hidden: true,
            selector_style: 1,
        }
    }

    /// Host option table (`LevelActions`, `LevelNames`, ...).
    pub fn into_map(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("LevelActions".to_owned(), self.level_actions),
            ("LevelNames".to_owned(), self.level_names.join("|")),
            (
                "LevelOffHidden".to_owned(),
                self.level_off_hidden.to_string(),
            ),
            ("SelectorStyle".to_owned(), self.selector_style.to_string()),
        ])
    }
}

/// Everything the host needs to create a mirrored device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Persisted identifier, the lock's nukiId as text.
    pub device_id: String,
    /// Per-lock slot (1 = status, 2 = sensor).
    pub slot: u8,
    pub name: String,
    pub device_type: u8,
    pub subtype: u8,
    pub switch_type: u8,
    pub options: BTreeMap<String, String>,
}

impl DeviceSpec {
    pub fn role(&self) -> Option<DeviceRole> {
        DeviceRole::from_slot(self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordinal_clamps_at_ninety() {
        assert_eq!(DeviceRole::Status.ordinal(Some(0)), 0);
        assert_eq!(DeviceRole::Status.ordinal(Some(1)), 10);
        assert_eq!(DeviceRole::Status.ordinal(Some(9)), 90);
        assert_eq!(DeviceRole::Status.ordinal(Some(10)), 90);
        assert_eq!(
            DeviceRole::Status.ordinal(Some(lock_state::MOTOR_BLOCKED)),
            90
        );
        assert_eq!(DeviceRole::Status.ordinal(None), 90);
    }

    #[test]
    fn sensor_ordinal_clamps_at_seventy() {
        assert_eq!(DeviceRole::Sensor.ordinal(Some(2)), 20);
        assert_eq!(DeviceRole::Sensor.ordinal(Some(7)), 70);
        assert_eq!(DeviceRole::Sensor.ordinal(Some(8)), 70);
        assert_eq!(DeviceRole::Sensor.ordinal(None), 70);
    }

    #[test]
    fn ordinals_never_exceed_max_for_any_state() {
        for state in 0..=u8::MAX {
            for role in [DeviceRole::Status, DeviceRole::Sensor] {
                let ordinal = role.ordinal(Some(state));
                assert!(ordinal <= role.max_ordinal());
                assert_eq!(ordinal, (u32::from(state) * 10).min(role.max_ordinal()));
            }
        }
    }

    #[test]
    fn labels_follow_levels() {
        assert_eq!(DeviceRole::Status.label(10), "locked");
        assert_eq!(DeviceRole::Status.label(90), "Unknown");
        assert_eq!(DeviceRole::Sensor.label(20), "door closed");
        assert_eq!(DeviceRole::Sensor.label(70), "removed");
        assert_eq!(DeviceRole::Sensor.label(500), "Unknown");
    }

    #[test]
    fn status_spec_matches_host_layout() {
        let spec = DeviceRole::Status.spec(NukiId(42), "Front Door");
        assert_eq!(spec.device_id, "42");
        assert_eq!(spec.slot, 1);
        assert_eq!(spec.name, "Front Door");
        assert_eq!(spec.device_type, 244);
        assert_eq!(spec.subtype, 62);
        assert_eq!(spec.switch_type, 18);
        assert_eq!(spec.options["LevelActions"], "|||||");
        assert_eq!(spec.options["LevelOffHidden"], "true");
        assert_eq!(spec.options["SelectorStyle"], "1");
        assert_eq!(spec.options["LevelNames"].split('|').count(), 10);
        assert!(spec.options["LevelNames"].starts_with("uncalibrated|locked|"));
    }

    #[test]
    fn sensor_spec_is_suffixed() {
        let spec = DeviceRole::Sensor.spec(NukiId(42), "Front Door");
        assert_eq!(spec.slot, 2);
        assert_eq!(spec.name, "Front Door Sensor");
        assert_eq!(
            spec.options["LevelNames"],
            "-|deactivated|door closed|door opened|unknown|calibrating|uncalibrated|removed"
        );
        assert_eq!(spec.role(), Some(DeviceRole::Sensor));
    }
}
