// ── Adapter ──
//
// Top-level owner of the bridge and lock registries and the host device
// table. Driven by `&mut self` from a single task: host lifecycle hooks,
// parsed callbacks from the listener, and the optional relist timer all
// funnel through here, so no registry is ever shared.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use nukly_api::{
    BridgeClient, CallbackPayload, DiscoveredBridge, DiscoveryClient, TransportConfig,
};

use crate::callback::{CallbackOutcome, CallbackRegistrar};
use crate::command::{CommandOutcome, translate};
use crate::config::AdapterConfig;
use crate::error::CoreError;
use crate::host::DeviceHost;
use crate::listener;
use crate::model::{Bridge, BridgeId, DeviceRole, DeviceUnit, Lock, NukiId};
use crate::reconcile::StateReconciler;
use crate::store::{BridgeRegistry, LockRegistry};

/// Capacity of the listener-to-adapter callback queue.
const CALLBACK_QUEUE: usize = 64;

/// Mirrors Nuki locks into a [`DeviceHost`].
#[derive(Debug)]
pub struct Adapter<H: DeviceHost> {
    config: AdapterConfig,
    http: reqwest::Client,
    bridges: BridgeRegistry,
    locks: LockRegistry,
    host: H,
    registrar: CallbackRegistrar,
}

impl<H: DeviceHost> Adapter<H> {
    /// Build an adapter with its own HTTP client. Only the configured
    /// bridge is registered until [`discover_bridges`](Self::discover_bridges) runs.
    pub fn new(config: AdapterConfig, host: H) -> Result<Self, CoreError> {
        let http = TransportConfig::default()
            .with_timeout(config.timeout)
            .build_client()?;
        Self::with_client(config, host, http)
    }

    /// Build an adapter on top of a pre-built `reqwest::Client`.
    pub fn with_client(
        config: AdapterConfig,
        host: H,
        http: reqwest::Client,
    ) -> Result<Self, CoreError> {
        let configured = Bridge::new(
            BridgeId::CONFIGURED,
            config.bridge.address.as_str(),
            config.bridge.port,
            config.bridge.api_key.clone(),
        )?;
        let mut bridges = BridgeRegistry::new();
        bridges.add(configured);

        Ok(Self {
            registrar: CallbackRegistrar::new(config.listen_port),
            config,
            http,
            bridges,
            locks: LockRegistry::new(),
            host,
        })
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn bridges(&self) -> &BridgeRegistry {
        &self.bridges
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// A client for bridge `id` sharing the adapter's connection pool.
    pub fn bridge_client(&self, id: BridgeId) -> Result<BridgeClient, CoreError> {
        self.bridges
            .get(id)
            .map(|b| b.client(&self.http))
            .ok_or(CoreError::UnknownBridge { id: id.0 })
    }

    // ── Lifecycle hooks ──────────────────────────────────────────────

    /// Host start: discover (if enabled), list every bridge, then make
    /// sure every bridge pushes callbacks to us. Failures are logged per
    /// bridge and never abort the start.
    pub async fn on_start(&mut self) {
        if self.config.discover {
            match self.discover_bridges().await {
                Ok(added) => debug!(added = added.len(), "discovery complete"),
                Err(e) => error!(error = %e, "bridge discovery failed"),
            }
        }

        let listed = self.refresh().await;
        info!(
            bridges = self.bridges.len(),
            listed,
            locks = self.locks.len(),
            "adapter started"
        );

        self.register_callbacks().await;
    }

    /// Host message: a raw callback body.
    pub fn on_message(&mut self, body: &[u8]) -> Result<(), CoreError> {
        let payload: CallbackPayload = serde_json::from_slice(body)?;
        self.on_callback(&payload)
    }

    /// Apply a parsed push callback.
    pub fn on_callback(&mut self, payload: &CallbackPayload) -> Result<(), CoreError> {
        StateReconciler::new(&mut self.host).apply_callback(&mut self.locks, payload)
    }

    /// Host command: the user picked `level` on device `unit`.
    pub async fn on_command(
        &mut self,
        unit: DeviceUnit,
        level: u32,
    ) -> Result<CommandOutcome, CoreError> {
        let unknown = CoreError::UnknownDevice { unit: unit.0 };
        let Some(device) = self.host.device(unit) else {
            return Err(unknown);
        };
        let (Some(role), Ok(nuki_id)) = (device.role(), device.device_id().parse::<NukiId>())
        else {
            return Err(unknown);
        };

        debug!(unit = unit.0, %nuki_id, %role, level, "host command");
        self.command(nuki_id, role, level).await
    }

    /// Run a command against lock `nuki_id`.
    ///
    /// Sensor commands and unmapped levels never reach the bridge; they
    /// force the device to re-show its current state.
    pub async fn command(
        &mut self,
        nuki_id: NukiId,
        role: DeviceRole,
        level: u32,
    ) -> Result<CommandOutcome, CoreError> {
        let Some(bridge) = self.locks.get(nuki_id).map(Lock::bridge) else {
            warn!(%nuki_id, "command for unknown lock rejected");
            return Err(CoreError::UnknownLock { nuki_id });
        };

        let command = if role.is_read_only() {
            None
        } else {
            translate(level)
        };

        let Some(command) = command else {
            let lock = self
                .locks
                .get_mut(nuki_id)
                .ok_or(CoreError::UnknownLock { nuki_id })?;
            let mut reconciler = StateReconciler::new(&mut self.host);
            match role {
                DeviceRole::Status => reconciler.apply_door(lock, None, None, true)?,
                DeviceRole::Sensor => reconciler.apply_sensor(lock, None, true)?,
            };
            debug!(%nuki_id, %role, level, "no action for level; refreshed");
            return Ok(CommandOutcome::Refreshed(role));
        };

        self.bridge_client(bridge)?
            .send_lock_action(nuki_id.0, command.action)
            .await?;
        info!(%nuki_id, action = %command.action, "lock action sent");

        let lock = self
            .locks
            .get_mut(nuki_id)
            .ok_or(CoreError::UnknownLock { nuki_id })?;
        StateReconciler::new(&mut self.host).apply_door(
            lock,
            Some(command.optimistic_door_state),
            None,
            true,
        )?;

        Ok(CommandOutcome::Sent {
            action: command.action,
            door_state: command.optimistic_door_state,
        })
    }

    // ── Bridge operations ────────────────────────────────────────────

    /// Ask the discovery service for bridges and register the new ones
    /// under their announced id, reusing the configured API key. Returns
    /// the ids that were added.
    pub async fn discover_bridges(&mut self) -> Result<Vec<BridgeId>, CoreError> {
        let found = self.announced_bridges().await?;

        let mut added = Vec::new();
        for announced in found {
            let id = BridgeId(announced.bridge_id);
            if self.bridges.get(id).is_some()
                || self.bridges.contains_endpoint(&announced.ip, announced.port)
            {
                debug!(bridge = %id, ip = %announced.ip, "discovered bridge already known");
                continue;
            }

            match Bridge::new(
                id,
                announced.ip.as_str(),
                announced.port,
                self.config.bridge.api_key.clone(),
            ) {
                Ok(bridge) => {
                    info!(bridge = %id, ip = %announced.ip, port = announced.port, "discovered bridge");
                    self.bridges.add(bridge);
                    added.push(id);
                }
                Err(e) => warn!(bridge = %id, error = %e, "skipping discovered bridge"),
            }
        }
        Ok(added)
    }

    /// Raw discovery listing, without touching the registry.
    pub async fn announced_bridges(&self) -> Result<Vec<DiscoveredBridge>, CoreError> {
        let url = Url::parse(&self.config.discovery_url).map_err(|e| CoreError::Config {
            message: format!("invalid discovery URL: {e}"),
        })?;
        Ok(DiscoveryClient::with_client(self.http.clone(), url)
            .discover()
            .await?)
    }

    /// List locks on every bridge. A bridge that fails contributes no
    /// locks this cycle; the others are still processed. Returns how many
    /// bridges listed successfully.
    pub async fn refresh(&mut self) -> usize {
        let ids: Vec<BridgeId> = self.bridges.all().map(Bridge::id).collect();
        let mut listed = 0;
        for id in ids {
            match self.refresh_bridge(id).await {
                Ok(count) => {
                    debug!(bridge = %id, locks = count, "bridge listed");
                    listed += 1;
                }
                Err(e) => error!(bridge = %id, error = %e, "listing locks failed"),
            }
        }
        listed
    }

    /// List locks on one bridge and reconcile each entry. A lock the host
    /// fails to store is logged and skipped; the rest of the listing is
    /// still applied. Returns how many entries were applied.
    pub async fn refresh_bridge(&mut self, id: BridgeId) -> Result<usize, CoreError> {
        let listing = self.bridge_client(id)?.list_locks().await?;

        let mut reconciler = StateReconciler::new(&mut self.host);
        let mut applied = 0;
        for info in &listing {
            match reconciler.upsert_from_listing(&mut self.locks, info, id) {
                Ok(()) => applied += 1,
                Err(e) => error!(
                    bridge = %id,
                    nuki_id = info.nuki_id,
                    error = %e,
                    "applying listed lock failed"
                ),
            }
        }
        Ok(applied)
    }

    /// Ensure our callback URL on bridge `id`.
    pub async fn ensure_callback(&self, id: BridgeId) -> Result<CallbackOutcome, CoreError> {
        let bridge = self
            .bridges
            .get(id)
            .ok_or(CoreError::UnknownBridge { id: id.0 })?;
        self.registrar
            .ensure(bridge, &bridge.client(&self.http))
            .await
    }

    /// Ensure callbacks on every bridge, logging failures.
    pub async fn register_callbacks(&self) -> Vec<(BridgeId, CallbackOutcome)> {
        let mut outcomes = Vec::new();
        for bridge in self.bridges.all() {
            match self.ensure_callback(bridge.id()).await {
                Ok(outcome) => outcomes.push((bridge.id(), outcome)),
                Err(e) => error!(bridge = %bridge.id(), error = %e, "callback registration failed"),
            }
        }
        outcomes
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Serve callbacks on `listener` and apply them until `cancel` fires.
    ///
    /// Also re-lists every bridge on the configured relist interval.
    pub async fn run(
        &mut self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), CoreError> {
        let (tx, mut rx) = mpsc::channel(CALLBACK_QUEUE);
        let server_cancel = cancel.child_token();
        let mut server = tokio::spawn(listener::serve(listener, tx, server_cancel.clone()));

        let mut relist = relist_timer(self.config.relist_interval);
        if let Some(timer) = relist.as_mut() {
            timer.tick().await;
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                payload = rx.recv() => {
                    let Some(payload) = payload else { break };
                    self.apply_pushed(&payload);
                }
                () = next_tick(&mut relist) => {
                    let listed = self.refresh().await;
                    debug!(listed, "periodic relist complete");
                }
            }
        }

        // Graceful shutdown lets in-flight requests finish, and their
        // payloads arrive after cancellation. Keep applying until the
        // listener task has ended.
        server_cancel.cancel();
        let served = loop {
            tokio::select! {
                joined = &mut server => break joined,
                payload = rx.recv() => match payload {
                    Some(payload) => self.apply_pushed(&payload),
                    None => break (&mut server).await,
                },
            }
        };
        while let Ok(payload) = rx.try_recv() {
            self.apply_pushed(&payload);
        }

        match served {
            Ok(result) => result,
            Err(e) => Err(CoreError::Listener(std::io::Error::other(e))),
        }
    }

    fn apply_pushed(&mut self, payload: &CallbackPayload) {
        if let Err(e) = self.on_callback(payload) {
            error!(nuki_id = payload.nuki_id, error = %e, "applying callback failed");
        }
    }
}

fn relist_timer(period: std::time::Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(timer)
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
