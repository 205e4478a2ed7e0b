// ── Inbound callback listener ──
//
// Accepts the bridge's push callbacks on any path and method. The listener
// never touches adapter state: it parses the body and forwards the payload
// to the adapter's event loop.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nukly_api::CallbackPayload;

use crate::error::CoreError;

/// Router that turns every request body into a [`CallbackPayload`].
pub fn router(tx: mpsc::Sender<CallbackPayload>) -> Router {
    Router::new().fallback(receive).with_state(tx)
}

async fn receive(State(tx): State<mpsc::Sender<CallbackPayload>>, body: Bytes) -> StatusCode {
    let payload = match serde_json::from_slice::<CallbackPayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "discarding malformed callback");
            return StatusCode::BAD_REQUEST;
        }
    };

    debug!(nuki_id = payload.nuki_id, "callback received");
    if tx.send(payload).await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

/// Bind the callback port on all interfaces.
pub async fn bind(port: u16) -> Result<TcpListener, CoreError> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(CoreError::Listener)?;
    info!(port, "callback listener bound");
    Ok(listener)
}

/// Serve callbacks until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    tx: mpsc::Sender<CallbackPayload>,
    cancel: CancellationToken,
) -> Result<(), CoreError> {
    axum::serve(listener, router(tx))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(CoreError::Listener)
}
