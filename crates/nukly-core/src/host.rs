// ── Host device seam ──
//
// The home-automation host owns the device table. The adapter only needs
// to enumerate devices, create one, and push a new value into one; any
// host that can do that implements `DeviceHost`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{DeviceRole, DeviceSpec, DeviceUnit};

/// A device as the host stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDevice {
    pub unit: DeviceUnit,
    #[serde(flatten)]
    pub spec: DeviceSpec,
    /// Current selector level.
    pub value: u32,
    /// Battery level shown next to the device, if any.
    pub battery: Option<u8>,
    /// Number of value writes since creation.
    #[serde(default)]
    pub writes: u64,
}

impl HostDevice {
    pub fn device_id(&self) -> &str {
        &self.spec.device_id
    }

    pub fn role(&self) -> Option<DeviceRole> {
        self.spec.role()
    }
}

/// The host's device table, as seen by the adapter.
pub trait DeviceHost {
    /// All devices currently known to the host.
    fn devices(&self) -> Vec<HostDevice>;

    /// Look up a device by its host handle.
    fn device(&self, unit: DeviceUnit) -> Option<HostDevice>;

    /// Create a device and return its handle.
    fn create(&mut self, spec: DeviceSpec) -> Result<DeviceUnit, CoreError>;

    /// Write a new value (and battery level) into a device.
    fn update(&mut self, unit: DeviceUnit, value: u32, battery: Option<u8>)
    -> Result<(), CoreError>;
}

// ── In-memory store ─────────────────────────────────────────────────

/// Device table kept in memory, optionally mirrored to a JSON file so
/// devices survive restarts and get re-linked by identifier.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    devices: BTreeMap<DeviceUnit, HostDevice>,
    next_unit: u32,
    path: Option<PathBuf>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            next_unit: 1,
            path: None,
        }
    }

    /// Open a store backed by `path`, loading existing devices if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let devices: Vec<HostDevice> = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| host_io(&path, &e))?;
            serde_json::from_str(&raw).map_err(|e| CoreError::Host {
                message: format!("corrupt device store {}: {e}", path.display()),
            })?
        } else {
            Vec::new()
        };

        let next_unit = devices.iter().map(|d| d.unit.0).max().unwrap_or(0) + 1;
        debug!(path = %path.display(), count = devices.len(), "loaded device store");

        Ok(Self {
            devices: devices.into_iter().map(|d| (d.unit, d)).collect(),
            next_unit,
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn persist(&self) -> Result<(), CoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| host_io(parent, &e))?;
        }
        let devices: Vec<&HostDevice> = self.devices.values().collect();
        let json = serde_json::to_string_pretty(&devices).map_err(|e| CoreError::Host {
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| host_io(path, &e))
    }
}

impl DeviceHost for MemoryDeviceStore {
    fn devices(&self) -> Vec<HostDevice> {
        self.devices.values().cloned().collect()
    }

    fn device(&self, unit: DeviceUnit) -> Option<HostDevice> {
        self.devices.get(&unit).cloned()
    }

    fn create(&mut self, spec: DeviceSpec) -> Result<DeviceUnit, CoreError> {
        let unit = DeviceUnit(self.next_unit.max(1));
        self.next_unit = unit.0 + 1;

        info!(unit = unit.0, name = %spec.name, device_id = %spec.device_id, "creating device");
        self.devices.insert(
            unit,
            HostDevice {
                unit,
                spec,
                value: 0,
                battery: None,
                writes: 0,
            },
        );
        self.persist()?;
        Ok(unit)
    }

    fn update(
        &mut self,
        unit: DeviceUnit,
        value: u32,
        battery: Option<u8>,
    ) -> Result<(), CoreError> {
        let device = self
            .devices
            .get_mut(&unit)
            .ok_or(CoreError::UnknownDevice { unit: unit.0 })?;

        device.value = value;
        device.battery = battery;
        device.writes += 1;

        let label = device.role().map_or("?", |role| role.label(value));
        info!(unit = unit.0, name = %device.spec.name, value, label, ?battery, "device updated");
        self.persist()
    }
}

fn host_io(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Host {
        message: format!("{}: {err}", path.display()),
    }
}
