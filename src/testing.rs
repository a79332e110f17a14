//! Shared test doubles.
//!
//! | Type | Stands in for |
//! |------|---------------|
//! | [`MockSocket`] / [`MockAdapter`] | Socket factory and adapter driven by the test |
//! | [`RecordingSocketListener`] | Socket listener |
//! | [`RecordingTransportObserver`] | Transport observer |
//! | [`RecordingPairingHandler`] | Pairing UI |
//! | [`RecordingDeviceObserver`] | Business observer |
//! | [`ScriptedHttpClient`] | HTTP client with queued responses |

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::codec::Instance;
use crate::error::{Error, Result};
use crate::session::DeviceObserver;
use crate::socket::{ReadyState, SocketAdapter, SocketFactory, SocketListener};
use crate::transport::{HttpClient, HttpResponse, PairingHandler, TransportObserver};

// ============================================================================
// Frames
// ============================================================================

/// Command envelope as the device would send it.
pub fn command_frame(method: &str, payload: &Value) -> String {
    json!({
        "type": "COMMAND",
        "method": method,
        "payload": payload.to_string(),
        "packageName": "com.example.device",
        "applicationId": "com.example.device:1.0",
        "remoteSourceSDK": "device:1.0",
    })
    .to_string()
}

// ============================================================================
// MockSocket
// ============================================================================

/// Socket factory that records every adapter it creates.
#[derive(Clone, Default)]
pub struct MockSocket {
    adapters: Arc<Mutex<Vec<Arc<MockAdapter>>>>,
}

impl MockSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> SocketFactory {
        let adapters = Arc::clone(&self.adapters);
        Arc::new(move |endpoint: &str| {
            let adapter = Arc::new(MockAdapter::new(endpoint));
            adapters.lock().push(Arc::clone(&adapter));
            Ok(adapter as Arc<dyn SocketAdapter>)
        })
    }

    /// Most recently created adapter.
    pub fn last(&self) -> Option<Arc<MockAdapter>> {
        self.adapters.lock().last().cloned()
    }

    /// Number of adapters created so far.
    pub fn created(&self) -> usize {
        self.adapters.lock().len()
    }
}

/// Adapter whose events are fired by the test.
pub struct MockAdapter {
    endpoint: String,
    state: AtomicU8,
    listener: Mutex<Option<Arc<dyn SocketListener>>>,
    sent: Mutex<Vec<String>>,
    pongs: Mutex<Vec<Vec<u8>>>,
    closes: Mutex<Vec<(u16, String)>>,
    broken: AtomicBool,
}

impl MockAdapter {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            state: AtomicU8::new(ReadyState::Closed as u8),
            listener: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            pongs: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
            broken: AtomicBool::new(false),
        }
    }

    fn listener(&self) -> Option<Arc<dyn SocketListener>> {
        self.listener.lock().clone()
    }

    fn set_state(&self, state: ReadyState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Completes the handshake.
    pub fn open(&self) {
        self.set_state(ReadyState::Open);
        if let Some(listener) = self.listener() {
            listener.on_open();
        }
    }

    /// Delivers a text frame.
    pub fn receive(&self, text: &str) {
        if let Some(listener) = self.listener() {
            listener.on_text_message(text);
        }
    }

    /// Delivers a ping frame.
    pub fn ping(&self, payload: &[u8]) {
        if let Some(listener) = self.listener() {
            listener.on_ping_frame(payload);
        }
    }

    /// The peer closed the connection.
    pub fn peer_close(&self, code: u16, reason: &str) {
        self.set_state(ReadyState::Closed);
        if let Some(listener) = self.listener() {
            listener.on_close_frame(code, reason);
            listener.on_disconnected(code, reason);
        }
    }

    /// Makes every later `send` fail while the socket stays open.
    pub fn fail_send(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// The handshake failed.
    pub fn fail_connect(&self) {
        self.set_state(ReadyState::Closed);
        if let Some(listener) = self.listener() {
            listener.on_connect_error(&Error::connection("connection refused"));
        }
    }

    /// Text frames sent while open.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Pong payloads sent.
    pub fn pongs(&self) -> Vec<Vec<u8>> {
        self.pongs.lock().clone()
    }

    /// Close requests as `(code, reason)`.
    pub fn closes(&self) -> Vec<(u16, String)> {
        self.closes.lock().clone()
    }
}

impl SocketAdapter for MockAdapter {
    fn connect(&self, listener: Arc<dyn SocketListener>) -> Result<()> {
        *self.listener.lock() = Some(listener);
        self.set_state(ReadyState::Connecting);
        Ok(())
    }

    fn send(&self, text: &str) -> Result<()> {
        if self.ready_state() != ReadyState::Open {
            return Err(Error::ConnectionClosed);
        }
        if self.broken.load(Ordering::SeqCst) {
            return Err(Error::connection("broken pipe"));
        }
        self.sent.lock().push(text.to_string());
        Ok(())
    }

    fn send_pong(&self, payload: &[u8]) -> Result<()> {
        if self.ready_state() != ReadyState::Open {
            return Err(Error::ConnectionClosed);
        }
        self.pongs.lock().push(payload.to_vec());
        Ok(())
    }

    fn close(&self, code: u16, reason: &str) -> Result<()> {
        self.closes.lock().push((code, reason.to_string()));
        self.set_state(ReadyState::Closed);
        Ok(())
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Recording Listeners
// ============================================================================

/// Records socket events as short strings.
#[derive(Default)]
pub struct RecordingSocketListener {
    events: Mutex<Vec<String>>,
}

impl RecordingSocketListener {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl SocketListener for RecordingSocketListener {
    fn on_open(&self) {
        self.push("open".to_string());
    }

    fn on_text_message(&self, text: &str) {
        self.push(format!("text:{text}"));
    }

    fn on_connect_error(&self, _error: &Error) {
        self.push("connect_error".to_string());
    }

    fn on_disconnected(&self, code: u16, _reason: &str) {
        self.push(format!("disconnected:{code}"));
    }

    fn on_ping_frame(&self, _payload: &[u8]) {
        self.push("ping".to_string());
    }
}

/// Records transport events.
#[derive(Default)]
pub struct RecordingTransportObserver {
    events: Mutex<Vec<&'static str>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingTransportObserver {
    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl TransportObserver for RecordingTransportObserver {
    fn on_connected(&self) {
        self.events.lock().push("connected");
    }

    fn on_ready(&self) {
        self.events.lock().push("ready");
    }

    fn on_disconnected(&self) {
        self.events.lock().push("disconnected");
    }

    fn on_message(&self, text: &str) {
        self.events.lock().push("message");
        self.messages.lock().push(text.to_string());
    }

    fn on_connection_error(&self, _error: &Error) {
        self.events.lock().push("connection_error");
    }
}

/// Records pairing callbacks.
#[derive(Default)]
pub struct RecordingPairingHandler {
    codes: Mutex<Vec<String>>,
    successes: Mutex<Vec<Option<String>>>,
    fail: AtomicBool,
}

impl RecordingPairingHandler {
    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().clone()
    }

    pub fn successes(&self) -> Vec<Option<String>> {
        self.successes.lock().clone()
    }

    /// Makes `on_pairing_success` return an error.
    pub fn fail_success(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl PairingHandler for RecordingPairingHandler {
    fn on_pairing_code(&self, code: &str) {
        self.codes.lock().push(code.to_string());
    }

    fn on_pairing_success(&self, token: Option<&str>) -> Result<()> {
        self.successes.lock().push(token.map(str::to_string));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::pairing("token store unavailable"));
        }
        Ok(())
    }
}

/// Records business events with their payload as JSON.
#[derive(Default)]
pub struct RecordingDeviceObserver {
    events: Mutex<Vec<(&'static str, Value)>>,
    acks: Mutex<Vec<String>>,
}

impl RecordingDeviceObserver {
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|(n, _)| *n == name).count()
    }

    /// Payload of the latest `name` event.
    pub fn last(&self, name: &str) -> Option<Value> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn acks(&self) -> Vec<String> {
        self.acks.lock().clone()
    }

    fn record(&self, name: &'static str, message: &Instance) {
        self.events.lock().push((name, message.to_json()));
    }
}

impl DeviceObserver for RecordingDeviceObserver {
    fn on_device_connected(&self) {
        self.events.lock().push(("connected", Value::Null));
    }

    fn on_device_ready(&self, discovery: &Instance) {
        self.record("device_ready", discovery);
    }

    fn on_device_disconnected(&self) {
        self.events.lock().push(("disconnected", Value::Null));
    }

    fn on_device_error(&self, error: &Error) {
        self.events
            .lock()
            .push(("error", Value::String(error.to_string())));
    }

    fn on_message_ack(&self, source_message_id: &str) {
        self.acks.lock().push(source_message_id.to_string());
    }

    fn on_discovery_response(&self, message: &Instance) {
        self.record("discovery_response", message);
    }

    fn on_ui_state(&self, message: &Instance) {
        self.record("ui_state", message);
    }

    fn on_tip_added(&self, message: &Instance) {
        self.record("tip_added", message);
    }

    fn on_verify_signature(&self, message: &Instance) {
        self.record("verify_signature", message);
    }

    fn on_finish_ok(&self, message: &Instance) {
        self.record("finish_ok", message);
    }

    fn on_print_payment(&self, message: &Instance) {
        self.record("print_payment", message);
    }
}

// ============================================================================
// ScriptedHttpClient
// ============================================================================

/// HTTP client answering from queues and recording requests.
///
/// An empty `OPTIONS` queue answers `200` with no headers; empty `GET` and
/// `POST` queues answer with a connection error.
#[derive(Default)]
pub struct ScriptedHttpClient {
    gets: Mutex<VecDeque<Result<HttpResponse>>>,
    posts: Mutex<VecDeque<Result<HttpResponse>>>,
    options: Mutex<VecDeque<Result<HttpResponse>>>,
    post_log: Mutex<Vec<(String, Value)>>,
    options_log: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_get(&self, response: Result<HttpResponse>) {
        self.gets.lock().push_back(response);
    }

    pub fn push_post(&self, response: Result<HttpResponse>) {
        self.posts.lock().push_back(response);
    }

    pub fn push_options(&self, response: Result<HttpResponse>) {
        self.options.lock().push_back(response);
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.post_log.lock().clone()
    }

    pub fn options_urls(&self) -> Vec<String> {
        self.options_log.lock().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.gets
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::connection(format!("unscripted GET {url}"))))
    }

    async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        self.post_log.lock().push((url.to_string(), body.clone()));
        self.posts
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::connection(format!("unscripted POST {url}"))))
    }

    async fn options(&self, url: &str) -> Result<HttpResponse> {
        self.options_log.lock().push(url.to_string());
        self.options
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, Value::Null)))
    }
}
