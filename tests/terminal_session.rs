//! End-to-end tests over a real WebSocket.
//!
//! A scripted terminal runs on a local `accept_async` server; the session
//! under test uses the default tokio-tungstenite adapter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use terminal_link::{
    DeviceObserver, DeviceSession, Instance, PairingHandler, Result, TransportOptions,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

type Terminal = WebSocketStream<TcpStream>;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn command(method: &str, payload: Value) -> Message {
    Message::text(
        json!({
            "type": "COMMAND",
            "method": method,
            "payload": payload.to_string(),
            "packageName": "com.example.device",
            "applicationId": "com.example.device:1.0",
            "remoteSourceSDK": "device:1.0",
        })
        .to_string(),
    )
}

/// Next text frame from the POS, parsed as an envelope object.
async fn next_envelope(ws: &mut Terminal) -> anyhow::Result<Value> {
    loop {
        let frame = timeout(WAIT, ws.next())
            .await
            .context("timed out waiting for a frame")?
            .context("socket closed")??;
        if frame.is_text() {
            return Ok(serde_json::from_str(frame.to_text()?)?);
        }
    }
}

fn payload(envelope: &Value) -> anyhow::Result<Value> {
    let text = envelope["payload"]
        .as_str()
        .context("envelope without payload")?;
    Ok(serde_json::from_str(text)?)
}

/// Accepts one connection and completes pairing.
async fn accept_and_pair(listener: &TcpListener, token: &str) -> anyhow::Result<(Terminal, Value)> {
    let (stream, _) = timeout(WAIT, listener.accept()).await??;
    let mut ws = accept_async(stream).await?;

    let request = next_envelope(&mut ws).await?;
    if request["method"] != "PAIRING_REQUEST" {
        bail!("expected pairing request, got {request}");
    }
    let pairing = payload(&request)?;

    ws.send(command("PAIRING_CODE", json!({"pairingCode": "424242"})))
        .await?;
    ws.send(command(
        "PAIRING_RESPONSE",
        json!({"pairingState": "PAIRED", "authenticationToken": token}),
    ))
    .await?;

    Ok((ws, pairing))
}

// ============================================================================
// Observer
// ============================================================================

/// Forwards events into a channel the test awaits on.
struct Events {
    tx: mpsc::UnboundedSender<String>,
    token: Mutex<Option<String>>,
}

impl Events {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                token: Mutex::new(None),
            }),
            rx,
        )
    }

    fn emit(&self, event: impl Into<String>) {
        let _ = self.tx.send(event.into());
    }
}

impl PairingHandler for Events {
    fn on_pairing_code(&self, code: &str) {
        self.emit(format!("code:{code}"));
    }

    fn on_pairing_success(&self, token: Option<&str>) -> Result<()> {
        *self.token.lock() = token.map(str::to_string);
        self.emit("paired");
        Ok(())
    }
}

impl DeviceObserver for Events {
    fn on_device_ready(&self, discovery: &Instance) {
        self.emit(format!("ready:{}", discovery.get_str("serial").unwrap_or("")));
    }

    fn on_device_disconnected(&self) {
        self.emit("disconnected");
    }

    fn on_tip_added(&self, message: &Instance) {
        self.emit(format!("tip:{}", message.get_i64("tipAmount").unwrap_or(-1)));
    }
}

async fn expect_event(rx: &mut mpsc::UnboundedReceiver<String>, expected: &str) -> anyhow::Result<()> {
    loop {
        let event = timeout(WAIT, rx.recv())
            .await
            .with_context(|| format!("timed out waiting for {expected}"))?
            .context("event channel closed")?;
        if event == expected {
            return Ok(());
        }
    }
}

fn session_for(url: &str, events: &Arc<Events>, token: Option<&str>) -> Result<DeviceSession> {
    let mut builder = DeviceSession::builder()
        .endpoint(url)
        .application_id("com.example.pos:1.0")
        .pos_name("Register 1")
        .serial_number("SN-1")
        .pairing_handler(events.clone())
        .transport_options(
            TransportOptions::new().with_reconnect_delay(Duration::from_millis(100)),
        );
    if let Some(token) = token {
        builder = builder.auth_token(token);
    }
    let session = builder.build()?;
    session.add_observer(events.clone());
    Ok(session)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_pair_discover_ping_and_ack() -> anyhow::Result<()> {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}/remote_pay", listener.local_addr()?);

    let (events, mut rx) = Events::new();
    let session = session_for(&url, &events, None)?;
    session.connect().await?;

    let (mut ws, pairing) = accept_and_pair(&listener, "tok1").await?;
    assert_eq!(pairing["name"], "Register 1");
    assert_eq!(pairing["authenticationToken"], Value::Null);
    expect_event(&mut rx, "code:424242").await?;
    expect_event(&mut rx, "paired").await?;
    assert_eq!(events.token.lock().as_deref(), Some("tok1"));

    // Ready triggers discovery.
    let discovery = next_envelope(&mut ws).await?;
    assert_eq!(discovery["method"], "DISCOVERY_REQUEST");
    assert_eq!(discovery["id"], "1");
    assert_eq!(discovery["applicationId"], "com.example.pos:1.0");
    ws.send(command(
        "DISCOVERY_RESPONSE",
        json!({"ready": true, "serial": "C0001", "supportsAcknowledgement": true}),
    ))
    .await?;
    expect_event(&mut rx, "ready:C0001").await?;

    // Envelope-level ping.
    ws.send(Message::text(
        json!({"type": "PING", "packageName": "p", "applicationId": "a", "remoteSourceSDK": "s"})
            .to_string(),
    ))
    .await?;
    let pong = next_envelope(&mut ws).await?;
    assert_eq!(pong["type"], "PONG");
    assert_eq!(pong["packageName"], "com.example.pos");
    assert!(pong.get("payload").is_none());

    // Acknowledged command.
    let pending = session.void_payment(&json!({"id": "PAY-1"}), "USER_CANCEL")?;
    let void = next_envelope(&mut ws).await?;
    assert_eq!(void["method"], "VOID_PAYMENT");
    assert_eq!(void["id"], "2");
    ws.send(command("ACK", json!({"sourceMessageId": "2"})))
        .await?;
    timeout(WAIT, pending.wait()).await??;

    // Business event.
    ws.send(command("TIP_ADDED", json!({"tipAmount": 175})))
        .await?;
    expect_event(&mut rx, "tip:175").await?;

    session.dispose();
    Ok(())
}

#[tokio::test]
async fn test_reconnects_and_presents_token() -> anyhow::Result<()> {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}/remote_pay", listener.local_addr()?);

    let (events, mut rx) = Events::new();
    let session = session_for(&url, &events, None)?;
    session.connect().await?;

    let (mut ws, _) = accept_and_pair(&listener, "tok1").await?;
    expect_event(&mut rx, "paired").await?;

    // Terminal drops the connection; the session comes back on its own.
    ws.close(None).await?;
    drop(ws);
    expect_event(&mut rx, "disconnected").await?;

    let (_ws, pairing) = accept_and_pair(&listener, "tok2").await?;
    assert_eq!(pairing["authenticationToken"], "tok1");
    expect_event(&mut rx, "paired").await?;
    assert_eq!(session.transport().auth_token().as_deref(), Some("tok2"));

    session.dispose();
    Ok(())
}

#[tokio::test]
async fn test_unreachable_terminal_reports_error() -> anyhow::Result<()> {
    init_logging();
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0").await?.local_addr()?.port();
    let url = format!("ws://127.0.0.1:{port}/remote_pay");

    let (events, mut rx) = Events::new();
    let session = session_for(&url, &events, None)?;
    session.connect().await?;

    expect_event(&mut rx, "disconnected").await?;
    assert!(!session.transport().is_open());
    assert!(!session.transport().has_pending_reconnect());

    session.dispose();
    Ok(())
}
