use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::CoreError;
use crate::host::{DeviceHost, HostDevice};
use crate::model::{BridgeId, DeviceRole, DeviceUnit, Lock, NukiId};

/// Locks keyed by nukiId. Entries are never removed.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: BTreeMap<NukiId, Lock>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, nuki_id: NukiId) -> Option<&Lock> {
        self.locks.get(&nuki_id)
    }

    pub(crate) fn get_mut(&mut self, nuki_id: NukiId) -> Option<&mut Lock> {
        self.locks.get_mut(&nuki_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lock> {
        self.locks.values()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Return the lock for `nuki_id`, wiring it on first sighting.
    ///
    /// A new lock gets its two host devices linked or created exactly once.
    /// The bridge reference is refreshed on every call, so the last bridge
    /// to list a lock owns it.
    pub(crate) fn wire<H: DeviceHost>(
        &mut self,
        nuki_id: NukiId,
        name: &str,
        bridge: BridgeId,
        host: &mut H,
    ) -> Result<&mut Lock, CoreError> {
        if !self.locks.contains_key(&nuki_id) {
            let (status, sensor) = link_devices(host, nuki_id, name)?;
            info!(%nuki_id, name, %bridge, "wired new lock");
            self.locks.insert(
                nuki_id,
                Lock::new(nuki_id, name.to_owned(), bridge, status, sensor),
            );
        }

        let lock = self
            .locks
            .get_mut(&nuki_id)
            .ok_or(CoreError::UnknownLock { nuki_id })?;
        if lock.bridge != bridge {
            debug!(%nuki_id, from = %lock.bridge, to = %bridge, "lock moved bridges");
            lock.bridge = bridge;
        }
        Ok(lock)
    }
}

/// Recover existing host devices for `nuki_id` by persisted identifier and
/// slot, creating whichever of the two is missing.
fn link_devices<H: DeviceHost>(
    host: &mut H,
    nuki_id: NukiId,
    name: &str,
) -> Result<(DeviceUnit, DeviceUnit), CoreError> {
    let device_id = nuki_id.to_string();
    let existing: Vec<HostDevice> = host
        .devices()
        .into_iter()
        .filter(|d| d.device_id() == device_id)
        .collect();

    let mut resolve = |role: DeviceRole| -> Result<DeviceUnit, CoreError> {
        if let Some(device) = existing.iter().find(|d| d.role() == Some(role)) {
            debug!(%nuki_id, %role, unit = device.unit.0, "linked existing device");
            return Ok(device.unit);
        }
        host.create(role.spec(nuki_id, name))
    };

    let status = resolve(DeviceRole::Status)?;
    let sensor = resolve(DeviceRole::Sensor)?;
    Ok((status, sensor))
}
