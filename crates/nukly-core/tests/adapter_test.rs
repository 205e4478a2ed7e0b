#![allow(clippy::unwrap_used)]
// Adapter scenarios against a wiremock bridge and the in-memory device store.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nukly_core::{
    Adapter, AdapterConfig, BridgeConfig, BridgeId, CallbackOutcome, CommandOutcome, CoreError,
    DeviceHost, DeviceRole, DeviceSpec, DeviceUnit, HostDevice, LockAction, MemoryDeviceStore,
    NukiId,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "s3cret";
const LISTEN_PORT: u16 = 5922;

fn config_for(server: &MockServer) -> AdapterConfig {
    AdapterConfig {
        bridge: BridgeConfig {
            address: "127.0.0.1".into(),
            port: server.address().port(),
            api_key: SecretString::from(TOKEN.to_string()),
        },
        listen_port: LISTEN_PORT,
        discovery_url: format!("{}/discover/bridges", server.uri()),
        ..AdapterConfig::default()
    }
}

fn adapter_for(server: &MockServer) -> Adapter<MemoryDeviceStore> {
    Adapter::new(config_for(server), MemoryDeviceStore::new()).unwrap()
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "nukiId": 1,
                "name": "Front Door",
                "lastKnownState": { "state": 1, "batteryChargeState": 80, "doorsensorState": 2 }
            }
        ])))
        .mount(server)
        .await;
}

/// An adapter that has already listed lock 1 (locked, 80 %, door closed).
async fn listed_adapter(server: &MockServer) -> Adapter<MemoryDeviceStore> {
    mount_listing(server).await;
    let mut adapter = adapter_for(server);
    assert_eq!(adapter.refresh().await, 1);
    adapter
}

/// Device table that refuses to create devices for one lock.
#[derive(Debug)]
struct RefusingStore {
    inner: MemoryDeviceStore,
    refused_id: &'static str,
}

impl DeviceHost for RefusingStore {
    fn devices(&self) -> Vec<HostDevice> {
        self.inner.devices()
    }

    fn device(&self, unit: DeviceUnit) -> Option<HostDevice> {
        self.inner.device(unit)
    }

    fn create(&mut self, spec: DeviceSpec) -> Result<DeviceUnit, CoreError> {
        if spec.device_id == self.refused_id {
            return Err(CoreError::Host {
                message: "device table full".into(),
            });
        }
        self.inner.create(spec)
    }

    fn update(&mut self, unit: DeviceUnit, value: u32, battery: Option<u8>) -> Result<(), CoreError> {
        self.inner.update(unit, value, battery)
    }
}

fn device_state(adapter: &Adapter<MemoryDeviceStore>, role: DeviceRole) -> (u32, Option<u8>, u64) {
    let unit = adapter.locks().get(NukiId(1)).unwrap().unit(role);
    let device = adapter.host().device(unit).unwrap();
    (device.value, device.battery, device.writes)
}

// ── Start-up ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_mirrors_listing_and_registers_callback() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/callback/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "callbacks": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/callback/add"))
        .and(query_param("token", TOKEN))
        .and(query_param("url", "http://127.0.0.1:5922"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut adapter = adapter_for(&server);
    adapter.on_start().await;

    assert_eq!(adapter.locks().len(), 1);
    assert_eq!(adapter.host().len(), 2);
    assert_eq!(device_state(&adapter, DeviceRole::Status), (10, Some(80), 1));
    assert_eq!(device_state(&adapter, DeviceRole::Sensor), (20, None, 1));

    let lock = adapter.locks().get(NukiId(1)).unwrap();
    assert_eq!(lock.name(), "Front Door");
    assert_eq!(lock.bridge(), BridgeId::CONFIGURED);
}

#[tokio::test]
async fn test_restart_relinks_existing_devices() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let mut first = adapter_for(&server);
    first.refresh().await;
    let host = first.into_host();

    let mut second = Adapter::new(config_for(&server), host).unwrap();
    second.refresh().await;

    assert_eq!(second.host().len(), 2);
    let lock = second.locks().get(NukiId(1)).unwrap();
    assert_eq!(lock.unit(DeviceRole::Status), DeviceUnit(1));
    assert_eq!(lock.unit(DeviceRole::Sensor), DeviceUnit(2));
}

#[tokio::test]
async fn test_failed_listing_leaves_registry_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let mut adapter = adapter_for(&server);
    assert_eq!(adapter.refresh().await, 0);
    assert!(adapter.locks().is_empty());
    assert!(adapter.host().is_empty());
}

#[tokio::test]
async fn test_host_failure_skips_only_that_lock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "nukiId": 2,
                "name": "Cellar",
                "lastKnownState": { "state": 3, "batteryChargeState": 20, "doorsensorState": 3 }
            },
            {
                "nukiId": 1,
                "name": "Front Door",
                "lastKnownState": { "state": 1, "batteryChargeState": 80, "doorsensorState": 2 }
            }
        ])))
        .mount(&server)
        .await;

    let host = RefusingStore {
        inner: MemoryDeviceStore::new(),
        refused_id: "2",
    };
    let mut adapter = Adapter::new(config_for(&server), host).unwrap();

    let applied = adapter.refresh_bridge(BridgeId::CONFIGURED).await.unwrap();

    assert_eq!(applied, 1);
    assert!(adapter.locks().get(NukiId(2)).is_none());
    let lock = adapter.locks().get(NukiId(1)).unwrap();
    let status = adapter.host().device(lock.unit(DeviceRole::Status)).unwrap();
    assert_eq!((status.value, status.battery), (10, Some(80)));
}

// ── Callbacks ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_partial_callback_updates_status_only() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    adapter
        .on_message(br#"{"nukiId":1,"state":3,"batteryChargeState":-1,"doorsensorState":-1}"#)
        .unwrap();

    assert_eq!(device_state(&adapter, DeviceRole::Status), (30, Some(80), 2));
    assert_eq!(device_state(&adapter, DeviceRole::Sensor), (20, None, 1));
}

#[tokio::test]
async fn test_callback_for_unknown_lock_is_ignored() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    adapter
        .on_message(br#"{"nukiId":99,"state":3}"#)
        .unwrap();

    assert_eq!(adapter.locks().len(), 1);
    assert_eq!(adapter.host().len(), 2);
}

#[tokio::test]
async fn test_malformed_message_is_an_error() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    let err = adapter.on_message(b"nope").unwrap_err();
    assert!(matches!(err, CoreError::Payload(_)));
}

#[tokio::test]
async fn test_existing_callback_is_not_re_added() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/callback/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "callbacks": [
                { "id": 0, "url": "http://10.0.0.5:8000" },
                { "id": 1, "url": "http://127.0.0.1:5922" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/callback/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let outcome = adapter.ensure_callback(BridgeId::CONFIGURED).await.unwrap();
    assert_eq!(
        outcome,
        CallbackOutcome::AlreadyRegistered {
            url: "http://127.0.0.1:5922".into()
        }
    );
}

#[tokio::test]
async fn test_second_registration_is_a_no_op() {
    let server = MockServer::start().await;

    // First list is empty, every later one already carries our URL.
    Mock::given(method("GET"))
        .and(path("/callback/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "callbacks": [] })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/callback/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "callbacks": [{ "id": 0, "url": "http://127.0.0.1:5922" }]
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/callback/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server);
    let first = adapter.register_callbacks().await;
    let second = adapter.register_callbacks().await;

    assert!(matches!(first[0].1, CallbackOutcome::Registered { .. }));
    assert!(matches!(second[0].1, CallbackOutcome::AlreadyRegistered { .. }));
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unlock_command_sends_action_and_shows_unlocked() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    Mock::given(method("GET"))
        .and(path("/lockAction"))
        .and(query_param("token", TOKEN))
        .and(query_param("nowait", "1"))
        .and(query_param("nukiId", "1"))
        .and(query_param("action", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let status_unit = adapter.locks().get(NukiId(1)).unwrap().unit(DeviceRole::Status);
    let outcome = adapter.on_command(status_unit, 20).await.unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Sent {
            action: LockAction::Unlock,
            door_state: 3
        }
    );
    assert_eq!(device_state(&adapter, DeviceRole::Status), (30, Some(80), 2));
    assert_eq!(adapter.locks().get(NukiId(1)).unwrap().door_state(), Some(3));
}

#[tokio::test]
async fn test_sensor_command_never_reaches_bridge() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    Mock::given(method("GET"))
        .and(path("/lockAction"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sensor_unit = adapter.locks().get(NukiId(1)).unwrap().unit(DeviceRole::Sensor);
    let outcome = adapter.on_command(sensor_unit, 10).await.unwrap();

    assert_eq!(outcome, CommandOutcome::Refreshed(DeviceRole::Sensor));
    assert_eq!(device_state(&adapter, DeviceRole::Sensor), (20, None, 2));
}

#[tokio::test]
async fn test_unmapped_level_forces_status_refresh() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    Mock::given(method("GET"))
        .and(path("/lockAction"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = adapter
        .command(NukiId(1), DeviceRole::Status, 90)
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Refreshed(DeviceRole::Status));
    assert_eq!(device_state(&adapter, DeviceRole::Status), (10, Some(80), 2));
}

#[tokio::test]
async fn test_command_for_unknown_lock_is_rejected() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    let err = adapter
        .command(NukiId(404), DeviceRole::Status, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownLock { nuki_id: NukiId(404) }));
}

#[tokio::test]
async fn test_failed_action_keeps_displayed_state() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    Mock::given(method("GET"))
        .and(path("/lockAction"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = adapter
        .command(NukiId(1), DeviceRole::Status, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(503), .. }));
    assert_eq!(device_state(&adapter, DeviceRole::Status), (10, Some(80), 1));
}

// ── Discovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_discovery_adds_new_bridges_and_skips_broken_ones() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&other)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/bridges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bridges": [
                { "bridgeId": 100, "ip": "127.0.0.1", "port": server.address().port() },
                { "bridgeId": 200, "ip": "127.0.0.1", "port": other.address().port() }
            ],
            "errorCode": 0
        })))
        .mount(&server)
        .await;

    let mut adapter = adapter_for(&server);
    let added = adapter.discover_bridges().await.unwrap();

    // The first entry is the configured bridge seen through discovery.
    assert_eq!(added, vec![BridgeId(200)]);
    assert_eq!(adapter.bridges().len(), 2);

    assert_eq!(adapter.refresh().await, 1);
    assert_eq!(adapter.locks().len(), 1);
}

// ── Event loop ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_applies_pushed_callbacks() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        adapter.run(listener, loop_cancel).await.unwrap();
        adapter
    });

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/"))
        .body(r#"{"nukiId":1,"state":1,"batteryChargeState":80,"doorsensorState":3}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    cancel.cancel();
    let adapter = handle.await.unwrap();

    assert_eq!(device_state(&adapter, DeviceRole::Sensor), (30, None, 2));
    assert_eq!(device_state(&adapter, DeviceRole::Status), (10, Some(80), 1));
}

#[tokio::test]
async fn test_run_applies_callback_still_arriving_at_shutdown() {
    let server = MockServer::start().await;
    let mut adapter = listed_adapter(&server).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        adapter.run(listener, loop_cancel).await.unwrap();
        adapter
    });

    // Headers first, so the request is in flight when shutdown starts.
    let body = r#"{"nukiId":1,"state":3}"#;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "POST / HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    cancel.cancel();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(body.as_bytes()).await.unwrap();

    let mut response = vec![0_u8; 64];
    let read = stream.read(&mut response).await.unwrap();
    let status_line = String::from_utf8_lossy(&response[..read]);
    assert!(status_line.starts_with("HTTP/1.1 200"), "got: {status_line}");
    drop(stream);

    let adapter = handle.await.unwrap();
    assert_eq!(device_state(&adapter, DeviceRole::Status), (30, Some(80), 2));
}

#[tokio::test]
async fn test_run_relists_on_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2..)
        .mount(&server)
        .await;

    let config = AdapterConfig {
        relist_interval: Duration::from_millis(40),
        ..config_for(&server)
    };
    let mut adapter = Adapter::new(config, MemoryDeviceStore::new()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move { adapter.run(listener, loop_cancel).await });

    tokio::time::sleep(Duration::from_millis(250)).await;
    cancel.cancel();
    handle.await.unwrap().unwrap();
}
