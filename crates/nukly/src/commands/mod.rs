//! Subcommand handlers.

pub mod action;
pub mod callbacks;
pub mod config_cmd;
pub mod discover;
pub mod locks;
pub mod run;

use tracing::{error, warn};

use nukly_config::Config;
use nukly_core::{Adapter, AdapterConfig, BridgeId, CoreError, MemoryDeviceStore};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(args, cfg, global).await,
        Command::Locks => locks::handle(cfg, global).await,
        Command::Callbacks(args) => callbacks::handle(&args, cfg, global).await,
        Command::Action(args) => action::handle(&args, cfg, global).await,
        Command::Discover => discover::handle(cfg, global).await,
        Command::Config(args) => config_cmd::handle(&args, global, Ok(cfg.clone())),
    }
}

/// An adapter over a throwaway device table, with discovered bridges
/// added when the config asks for them.
async fn session(adapter_cfg: AdapterConfig) -> Result<Adapter<MemoryDeviceStore>, CliError> {
    let mut adapter = Adapter::new(adapter_cfg, MemoryDeviceStore::new())?;
    if adapter.config().discover {
        if let Err(e) = adapter.discover_bridges().await {
            warn!(error = %e, "bridge discovery failed");
        }
    }
    Ok(adapter)
}

/// List every bridge. A bridge that fails is logged and skipped; the
/// command fails only when no bridge could be listed.
async fn list_all(adapter: &mut Adapter<MemoryDeviceStore>) -> Result<(), CliError> {
    let ids: Vec<BridgeId> = adapter.bridges().all().map(|b| b.id()).collect();
    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        results.push((id, adapter.refresh_bridge(id).await));
    }
    per_bridge(results, "listing locks failed")?;
    Ok(())
}

/// Keep the bridges that answered. Failures are logged, and the first one
/// is returned only when every bridge failed.
fn per_bridge<T>(
    results: Vec<(BridgeId, Result<T, CoreError>)>,
    what: &str,
) -> Result<Vec<(BridgeId, T)>, CliError> {
    let mut answered = Vec::with_capacity(results.len());
    let mut first_err = None;
    for (id, result) in results {
        match result {
            Ok(value) => answered.push((id, value)),
            Err(e) => {
                error!(bridge = %id, error = %e, "{what}");
                first_err.get_or_insert(e);
            }
        }
    }

    match first_err {
        Some(e) if answered.is_empty() => Err(e.into()),
        _ => Ok(answered),
    }
}
