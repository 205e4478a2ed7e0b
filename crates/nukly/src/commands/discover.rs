//! `nukly discover`

use secrecy::SecretString;
use tabled::Tabled;

use nukly_config::Config;
use nukly_core::{Adapter, DiscoveredBridge, MemoryDeviceStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct BridgeRow {
    #[tabled(rename = "Bridge ID")]
    id: u64,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&DiscoveredBridge> for BridgeRow {
    fn from(b: &DiscoveredBridge) -> Self {
        Self {
            id: b.bridge_id,
            ip: b.ip.clone(),
            port: b.port,
            updated: b.date_updated.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    // Discovery is unauthenticated; fall back to an empty token.
    let adapter_cfg = crate::config::adapter_config(cfg, global).or_else(|e| match e {
        CliError::NoCredentials { .. } => Ok(nukly_config::to_adapter_config(
            cfg,
            SecretString::from(String::new()),
        )),
        other => Err(other),
    })?;

    let adapter = Adapter::new(adapter_cfg, MemoryDeviceStore::new())?;
    let bridges = adapter.announced_bridges().await?;

    let out = output::render_list(
        &global.output,
        &bridges,
        |b| BridgeRow::from(b),
        |b| b.ip.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
