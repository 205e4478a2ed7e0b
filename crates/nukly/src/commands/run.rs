//! `nukly run`: the long-running adapter.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use nukly_config::Config;
use nukly_core::{Adapter, MemoryDeviceStore, listener};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;

pub async fn handle(args: RunArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut adapter_cfg = crate::config::adapter_config(cfg, global)?;
    adapter_cfg.discover |= args.discover;
    let listen_port = adapter_cfg.listen_port;

    let store_path = args
        .device_store
        .unwrap_or_else(|| cfg.device_store_path());
    let store = MemoryDeviceStore::open(&store_path)?;
    let mut adapter = Adapter::new(adapter_cfg, store)?;

    // Bind before registering so the advertised URL is already live.
    let socket = listener::bind(listen_port).await?;
    adapter.on_start().await;

    if !global.quiet {
        eprintln!(
            "nukly: {} lock(s) on {} bridge(s), callbacks on port {listen_port}, devices in {}",
            adapter.locks().len(),
            adapter.bridges().len(),
            store_path.display()
        );
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, shutting down"),
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C; shutting down"),
        }
        on_signal.cancel();
    });

    adapter.run(socket, cancel).await?;
    Ok(())
}
