// Nuki Bridge API response types
//
// Models for the bridge's JSON vocabulary. State axes (lock state, battery,
// door sensor) arrive as plain integers where a negative value means "this
// payload carries no information"; they are decoded into `Option<u8>` so
// nothing downstream has to know about the sentinel.

use serde::{Deserialize, Deserializer, Serialize};

// ── State axis decoding ──────────────────────────────────────────────

/// Decode an optional integer axis. Missing, `null`, and negative values
/// become `None`; values above 255 saturate to `u8::MAX`.
fn state_axis<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| {
        if v < 0 {
            None
        } else {
            Some(u8::try_from(v).unwrap_or(u8::MAX))
        }
    }))
}

// ── Lock listing ─────────────────────────────────────────────────────

/// One entry of `GET /list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    pub nuki_id: u64,
    pub name: String,
    #[serde(default)]
    pub last_known_state: LastKnownState,
}

/// The `lastKnownState` object embedded in a listing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastKnownState {
    #[serde(default, deserialize_with = "state_axis")]
    pub state: Option<u8>,
    #[serde(default, deserialize_with = "state_axis")]
    pub battery_charge_state: Option<u8>,
    #[serde(rename = "doorsensorState", default, deserialize_with = "state_axis")]
    pub door_sensor_state: Option<u8>,
}

// ── Callbacks ────────────────────────────────────────────────────────

/// Response of `GET /callback/list`. Older firmware omits the key entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackList {
    #[serde(default)]
    pub callbacks: Vec<CallbackEntry>,
}

/// A registered push-callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEntry {
    #[serde(default)]
    pub id: Option<u32>,
    pub url: String,
}

/// Body the bridge POSTs to a registered callback URL.
///
/// Any axis may be missing or negative when the bridge has nothing to
/// report for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub nuki_id: u64,
    #[serde(default, deserialize_with = "state_axis")]
    pub state: Option<u8>,
    #[serde(default, deserialize_with = "state_axis")]
    pub battery_charge_state: Option<u8>,
    #[serde(rename = "doorsensorState", default, deserialize_with = "state_axis")]
    pub door_sensor_state: Option<u8>,
}

// ── Lock actions ─────────────────────────────────────────────────────

/// Bridge-defined `action` op-codes for `/lockAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockAction {
    Unlock,
    Lock,
    Unlatch,
    LockNGo,
}

impl LockAction {
    /// Numeric op-code sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Unlock => 1,
            Self::Lock => 2,
            Self::Unlatch => 3,
            Self::LockNGo => 4,
        }
    }
}

impl std::fmt::Display for LockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unlock => "unlock",
            Self::Lock => "lock",
            Self::Unlatch => "unlatch",
            Self::LockNGo => "lock 'n' go",
        };
        f.write_str(label)
    }
}

// ── Discovery ────────────────────────────────────────────────────────

/// Response of the cloud discovery service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    #[serde(default)]
    pub bridges: Vec<DiscoveredBridge>,
    #[serde(default)]
    pub error_code: Option<i32>,
}

/// A bridge announced by the discovery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredBridge {
    pub bridge_id: u64,
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub date_updated: Option<String>,
}
