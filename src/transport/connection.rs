//! Transport connection: lifecycle, pairing and reconnection.
//!
//! A [`TransportConnection`] owns at most one [`SocketClient`] at a time.
//! It pairs with the device (or, behind the cloud relay, signals ready as
//! soon as the socket opens), forwards business frames to observers and
//! reconnects after the socket closes.
//!
//! # States
//!
//! ```text
//! Disconnected → Connecting → Open(Pairing) → Open(Ready) → Closing → Disconnected
//! ```
//!
//! [`TransportConnection::dispose`] moves to a terminal shutdown state from
//! anywhere.
//!
//! # Re-entrancy
//!
//! Socket events may arrive on the task that triggered them (for example an
//! adapter that opens synchronously inside `connect`). State is therefore
//! only locked for short bookkeeping sections and never while observers,
//! the pairing handler or the socket are called.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::endpoint::{EndpointResolver, OpenAction, ResolveContext, Resolution};
use super::observer::{PairingHandler, TransportObserver};
use crate::config::TransportOptions;
use crate::error::{Error, Result};
use crate::protocol::{Envelope, Method, Origin, PairingCode, PairingRequest, PairingResponse};
use crate::socket::{SocketClient, SocketFactory, SocketListener};

// ============================================================================
// TransportSetup
// ============================================================================

/// Everything a transport needs. Assembled by
/// [`SessionBuilder`](crate::SessionBuilder).
pub struct TransportSetup {
    /// Name shown on the device during pairing.
    pub pos_name: String,
    /// Serial number of the POS.
    pub serial_number: String,
    /// Routing fields stamped on pairing envelopes.
    pub origin: Origin,
    /// Token from a previous pairing, if any.
    pub auth_token: Option<String>,
    /// Creates socket adapters.
    pub socket_factory: SocketFactory,
    /// Finds the socket URL.
    pub resolver: Arc<dyn EndpointResolver>,
    /// Pairing UI.
    pub pairing_handler: Option<Arc<dyn PairingHandler>>,
    /// Reconnection behavior.
    pub options: TransportOptions,
}

// ============================================================================
// State
// ============================================================================

#[derive(Default)]
struct TransportState {
    socket: Option<Arc<SocketClient>>,
    /// Bumped whenever `socket` is replaced; events from older sockets are
    /// ignored.
    generation: u64,
    endpoint: Option<String>,
    auth_token: Option<String>,
    is_pairing: bool,
    ready_fired: bool,
    shutdown: bool,
    reconnect: Option<JoinHandle<()>>,
}

struct TransportInner {
    pos_name: String,
    serial_number: String,
    origin: Origin,
    factory: SocketFactory,
    resolver: Arc<dyn EndpointResolver>,
    pairing_handler: Option<Arc<dyn PairingHandler>>,
    options: TransportOptions,
    observers: RwLock<Vec<Arc<dyn TransportObserver>>>,
    state: Mutex<TransportState>,
}

// ============================================================================
// TransportConnection
// ============================================================================

/// Connection to one payment terminal.
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct TransportConnection {
    inner: Arc<TransportInner>,
}

impl TransportConnection {
    /// Creates a transport. Nothing connects until
    /// [`establish`](Self::establish) or [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(setup: TransportSetup) -> Self {
        let state = TransportState {
            auth_token: setup.auth_token,
            ..TransportState::default()
        };

        Self {
            inner: Arc::new(TransportInner {
                pos_name: setup.pos_name,
                serial_number: setup.serial_number,
                origin: setup.origin,
                factory: setup.socket_factory,
                resolver: setup.resolver,
                pairing_handler: setup.pairing_handler,
                options: setup.options,
                observers: RwLock::new(Vec::new()),
                state: Mutex::new(state),
            }),
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Subscribes an observer.
    pub fn add_observer(&self, observer: Arc<dyn TransportObserver>) {
        self.inner.observers.write().push(observer);
    }

    /// Unsubscribes an observer. Returns `true` if it was subscribed.
    pub fn remove_observer(&self, observer: &Arc<dyn TransportObserver>) -> bool {
        let mut observers = self.inner.observers.write();
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    /// Unsubscribes every observer.
    pub fn clear_observers(&self) {
        self.inner.observers.write().clear();
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Resolves the endpoint and connects.
    ///
    /// Resolution errors are reported to observers and returned; no
    /// reconnect is scheduled for them.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] after [`dispose`](Self::dispose)
    /// - [`Error::AccessDenied`] if another session owns the device
    /// - [`Error::Connection`] if the endpoint cannot be resolved
    /// - Any error from creating or starting the socket
    pub async fn establish(&self) -> Result<()> {
        match TransportInner::resolve(&self.inner).await? {
            Some(url) => TransportInner::initialize(&self.inner, &url),
            None => Ok(()),
        }
    }

    /// Connects to `endpoint` unless a socket is already open or connecting.
    ///
    /// # Errors
    ///
    /// Returns any error from creating or starting the socket.
    pub fn initialize(&self, endpoint: &str) -> Result<()> {
        TransportInner::initialize(&self.inner, endpoint)
    }

    /// Sends a text frame.
    ///
    /// Never blocks. Without an open socket a reconnect is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the frame was not sent.
    pub fn send_message(&self, text: &str) -> Result<()> {
        TransportInner::send_message(&self.inner, text)
    }

    /// Shuts the transport down for good.
    ///
    /// Cancels any pending reconnect, notifies observers if a socket existed
    /// and closes it. Close errors are logged and swallowed.
    pub fn dispose(&self) {
        let (socket, timer) = {
            let mut state = self.inner.state.lock();
            state.shutdown = true;
            state.generation += 1;
            (state.socket.take(), state.reconnect.take())
        };

        if let Some(timer) = timer {
            timer.abort();
        }

        if let Some(socket) = socket {
            info!(endpoint = %socket.endpoint(), "Disposing transport");
            self.inner.notify(|o| o.on_disconnected());
            if let Err(e) = socket.close(self.inner.options.close_code, "disposed") {
                debug!(error = %e, "Socket close failed during dispose");
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns `true` if a socket is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.current_socket().is_some_and(|s| s.is_open())
    }

    /// Returns `true` while pairing is in progress.
    #[must_use]
    pub fn is_pairing(&self) -> bool {
        self.inner.state.lock().is_pairing
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.state.lock().shutdown
    }

    /// Token from the last successful pairing.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.inner.state.lock().auth_token.clone()
    }

    /// Endpoint of the last connection attempt.
    #[must_use]
    pub fn endpoint(&self) -> Option<String> {
        self.inner.state.lock().endpoint.clone()
    }

    /// Returns `true` while a reconnect timer is armed.
    #[must_use]
    pub fn has_pending_reconnect(&self) -> bool {
        self.inner
            .state
            .lock()
            .reconnect
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl fmt::Debug for TransportConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("TransportConnection")
            .field("endpoint", &state.endpoint)
            .field("generation", &state.generation)
            .field("is_pairing", &state.is_pairing)
            .field("shutdown", &state.shutdown)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TransportInner - Connection Management
// ============================================================================

impl TransportInner {
    /// Runs the resolver. `Ok(None)` means the open socket is kept.
    async fn resolve(this: &Arc<Self>) -> Result<Option<String>> {
        if this.state.lock().shutdown {
            return Err(Error::ConnectionClosed);
        }

        let context = ResolveContext {
            socket_open: this.current_socket().is_some_and(|s| s.is_open()),
        };

        match this.resolver.resolve(context).await {
            Ok(Resolution::AlreadyConnected) => Ok(None),
            Ok(Resolution::Connect {
                url,
                replace_existing,
            }) => {
                if replace_existing {
                    this.close_current_socket();
                }
                Ok(Some(url))
            }
            Err(e) => {
                warn!(error = %e, "Endpoint resolution failed");
                this.report_connection_error(&e);
                Err(e)
            }
        }
    }

    fn initialize(this: &Arc<Self>, endpoint: &str) -> Result<()> {
        let (socket, generation) = {
            let mut state = this.state.lock();
            if state.shutdown {
                debug!("Transport disposed, not connecting");
                return Ok(());
            }
            if let Some(socket) = &state.socket
                && (socket.is_open() || socket.is_connecting())
            {
                trace!(endpoint = %socket.endpoint(), "Socket already live");
                return Ok(());
            }

            state.socket = None;
            state.generation += 1;
            state.endpoint = Some(endpoint.to_string());
            let generation = state.generation;

            let listener = Arc::new(SocketEvents {
                transport: Arc::downgrade(this),
                generation,
            });
            let socket = Arc::new(SocketClient::new(endpoint, &this.factory, listener)?);
            state.socket = Some(Arc::clone(&socket));
            (socket, generation)
        };

        debug!(endpoint, generation, "Opening socket");
        if let Err(e) = socket.connect() {
            let mut state = this.state.lock();
            if state.generation == generation {
                state.socket = None;
            }
            return Err(e);
        }
        Ok(())
    }

    fn send_message(this: &Arc<Self>, text: &str) -> Result<()> {
        let socket = {
            let state = this.state.lock();
            if state.shutdown {
                return Err(Error::ConnectionClosed);
            }
            state.socket.clone()
        };

        match socket {
            Some(socket) if socket.is_open() => match socket.send(text) {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!(error = %e, "Send failed, reconnecting");
                    Self::schedule_reconnect(this);
                    Err(Error::ConnectionClosed)
                }
            },
            _ => {
                debug!("No open socket, reconnecting");
                Self::schedule_reconnect(this);
                Err(Error::ConnectionClosed)
            }
        }
    }

    /// Arms the reconnect timer unless one is armed or the transport is
    /// disposed.
    fn schedule_reconnect(this: &Arc<Self>) {
        let mut state = this.state.lock();
        if state.shutdown {
            return;
        }
        if state
            .reconnect
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
        {
            trace!("Reconnect already scheduled");
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!("No tokio runtime, cannot schedule reconnect");
            return;
        };

        let delay = this.options.reconnect_delay;
        let weak = Arc::downgrade(this);
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling reconnect");

        state.reconnect = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(this) = weak.upgrade() else {
                return;
            };
            this.state.lock().reconnect = None;
            Self::reconnect(&this).await;
        }));
    }

    async fn reconnect(this: &Arc<Self>) {
        if this.state.lock().shutdown {
            return;
        }
        info!("Reconnecting");

        // Resolution failures are reported and end the loop here.
        let Ok(Some(url)) = Self::resolve(this).await else {
            return;
        };
        if let Err(e) = Self::initialize(this, &url) {
            warn!(error = %e, "Reconnect failed, retrying");
            Self::schedule_reconnect(this);
        }
    }

    fn close_current_socket(&self) {
        let socket = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.socket.take()
        };
        if let Some(socket) = socket
            && let Err(e) = socket.close(self.options.close_code, "replaced")
        {
            debug!(error = %e, "Closing replaced socket failed");
        }
    }

    fn current_socket(&self) -> Option<Arc<SocketClient>> {
        self.state.lock().socket.clone()
    }

    /// Reports a failed connection attempt. Access denial is not a
    /// disconnect.
    fn report_connection_error(&self, error: &Error) {
        self.notify(|o| o.on_connection_error(error));
        if !error.is_access_denied() {
            self.notify(|o| o.on_disconnected());
        }
    }

    fn notify(&self, f: impl Fn(&dyn TransportObserver)) {
        let observers = self.observers.read().clone();
        for observer in &observers {
            f(observer.as_ref());
        }
    }

    /// Returns `true` if `generation` is the live socket.
    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.generation == generation && state.socket.is_some()
    }
}

// ============================================================================
// TransportInner - Pairing
// ============================================================================

impl TransportInner {
    fn send_pairing_request(this: &Arc<Self>) {
        let token = {
            let mut state = this.state.lock();
            state.is_pairing = true;
            state.auth_token.clone()
        };

        let request = PairingRequest::new(&this.pos_name, &this.serial_number, token.as_deref());
        let frame = serde_json::to_string(&request)
            .map_err(Error::from)
            .and_then(|payload| {
                Envelope::command(None, Method::PairingRequest, payload, &this.origin).to_json()
            });

        match frame {
            Ok(frame) => {
                debug!(has_token = token.is_some(), "Sending pairing request");
                if let Err(e) = Self::send_message(this, &frame) {
                    warn!(error = %e, "Pairing request not sent");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode pairing request"),
        }
    }

    fn handle_pairing_message(this: &Arc<Self>, text: &str) {
        let envelope = match Envelope::from_json(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Malformed frame while pairing, dropping");
                return;
            }
        };

        let method = match envelope.method_kind() {
            Ok(method) => method,
            Err(e) => {
                warn!(error = %e, envelope_type = ?envelope.envelope_type, "Unexpected frame while pairing, dropping");
                return;
            }
        };

        match method {
            Method::PairingCode => match envelope.parse_payload::<PairingCode>() {
                Ok(code) => {
                    info!("Pairing code received");
                    match &this.pairing_handler {
                        Some(handler) => handler.on_pairing_code(&code.pairing_code),
                        None => warn!("Pairing code received but no pairing handler is set"),
                    }
                }
                Err(e) => warn!(error = %e, "Malformed pairing code"),
            },

            Method::PairingResponse => match envelope.parse_payload::<PairingResponse>() {
                Ok(response) if response.pairing_state.is_paired() => {
                    Self::complete_pairing(this, response.authentication_token);
                }
                Ok(_) => {
                    info!("Pairing failed, retrying");
                    Self::send_pairing_request(this);
                }
                Err(e) => warn!(error = %e, "Malformed pairing response"),
            },

            other => {
                warn!(method = %other, "Unexpected method while pairing, dropping");
            }
        }
    }

    fn complete_pairing(this: &Arc<Self>, token: Option<String>) {
        let fire_ready = {
            let mut state = this.state.lock();
            state.is_pairing = false;
            state.auth_token = token.clone();
            !std::mem::replace(&mut state.ready_fired, true)
        };

        info!("Paired");
        if let Some(handler) = &this.pairing_handler
            && let Err(e) = handler.on_pairing_success(token.as_deref())
        {
            warn!(error = %e, "Pairing success handler failed");
        }

        if fire_ready {
            this.notify(|o| o.on_ready());
        }
    }

    fn signal_ready(this: &Arc<Self>) {
        let fire_ready = {
            let mut state = this.state.lock();
            state.is_pairing = false;
            !std::mem::replace(&mut state.ready_fired, true)
        };
        if fire_ready {
            this.notify(|o| o.on_ready());
        }
    }
}

// ============================================================================
// SocketEvents
// ============================================================================

/// Socket listener bound to one socket generation.
struct SocketEvents {
    transport: Weak<TransportInner>,
    generation: u64,
}

impl SocketEvents {
    fn live(&self) -> Option<Arc<TransportInner>> {
        let transport = self.transport.upgrade()?;
        if transport.is_current(self.generation) {
            Some(transport)
        } else {
            trace!(generation = self.generation, "Ignoring event from stale socket");
            None
        }
    }

    /// Drops the socket if it is still current. Returns `false` if stale.
    fn detach(&self, transport: &TransportInner) -> bool {
        let mut state = transport.state.lock();
        if state.generation != self.generation || state.socket.is_none() {
            return false;
        }
        state.socket = None;
        state.is_pairing = false;
        true
    }
}

impl SocketListener for SocketEvents {
    fn on_open(&self) {
        let Some(transport) = self.live() else {
            return;
        };

        {
            let mut state = transport.state.lock();
            state.ready_fired = false;
            state.is_pairing = false;
        }

        info!(generation = self.generation, "Socket connected");
        transport.notify(|o| o.on_connected());

        match transport.resolver.open_action() {
            OpenAction::Pair => TransportInner::send_pairing_request(&transport),
            OpenAction::Ready => TransportInner::signal_ready(&transport),
        }
    }

    fn on_text_message(&self, text: &str) {
        let Some(transport) = self.live() else {
            return;
        };

        if transport.state.lock().is_pairing {
            TransportInner::handle_pairing_message(&transport, text);
        } else {
            transport.notify(|o| o.on_message(text));
        }
    }

    fn on_connect_error(&self, error: &Error) {
        let Some(transport) = self.transport.upgrade() else {
            return;
        };
        if !self.detach(&transport) {
            return;
        }

        warn!(error = %error, "Socket failed to connect");
        transport.report_connection_error(error);
        if transport.options.reconnect_on_connect_error {
            TransportInner::schedule_reconnect(&transport);
        }
    }

    fn on_disconnected(&self, code: u16, reason: &str) {
        let Some(transport) = self.transport.upgrade() else {
            return;
        };
        if !self.detach(&transport) {
            return;
        }

        info!(code, reason, "Socket disconnected");
        transport.notify(|o| o.on_disconnected());
        TransportInner::schedule_reconnect(&transport);
    }

    fn on_close_frame(&self, code: u16, reason: &str) {
        debug!(code, reason, "Close frame received");
    }

    fn on_send_error(&self, error: &Error) {
        let Some(transport) = self.live() else {
            return;
        };
        warn!(error = %error, "Socket send failed, reconnecting");
        TransportInner::schedule_reconnect(&transport);
    }
}

// ============================================================================
// Tests
// ============================================================================
