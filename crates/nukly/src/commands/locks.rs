//! `nukly locks`

use tabled::Tabled;

use nukly_config::Config;
use nukly_core::{DeviceRole, Lock};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct LockRow {
    #[tabled(rename = "Nuki ID")]
    nuki_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bridge")]
    bridge: String,
    #[tabled(rename = "Lock")]
    state: &'static str,
    #[tabled(rename = "Door")]
    door: &'static str,
    #[tabled(rename = "Battery")]
    battery: String,
}

impl From<&Lock> for LockRow {
    fn from(lock: &Lock) -> Self {
        Self {
            nuki_id: lock.nuki_id().to_string(),
            name: lock.name().to_owned(),
            bridge: lock.bridge().to_string(),
            state: DeviceRole::Status.label(lock.status_ordinal()),
            door: DeviceRole::Sensor.label(lock.sensor_ordinal()),
            battery: lock
                .battery_charge_state()
                .map_or_else(|| "-".into(), |b| format!("{b}%")),
        }
    }
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut adapter = super::session(crate::config::adapter_config(cfg, global)?).await?;
    super::list_all(&mut adapter).await?;

    let locks: Vec<&Lock> = adapter.locks().iter().collect();
    let out = output::render_list(
        &global.output,
        &locks,
        |lock| LockRow::from(*lock),
        |lock| lock.nuki_id().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
