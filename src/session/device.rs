//! Device session: envelope dispatch, message ids and acknowledgements.
//!
//! A [`DeviceSession`] sits on top of a [`TransportConnection`]. It turns
//! outbound commands into envelopes with fresh message ids, answers pings,
//! decodes inbound commands through the [`MethodRegistry`] and fans them out
//! to [`DeviceObserver`]s.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use terminal_link::{DeviceObserver, DeviceSession, Instance};
//!
//! struct Tips;
//!
//! impl DeviceObserver for Tips {
//!     fn on_tip_added(&self, message: &Instance) {
//!         println!("tip: {:?}", message.get_i64("tipAmount"));
//!     }
//! }
//!
//! # async fn example() -> terminal_link::Result<()> {
//! let session = DeviceSession::builder()
//!     .endpoint("wss://192.168.1.20:12345/remote_pay")
//!     .application_id("com.example.pos:1.0")
//!     .pos_name("Register 1")
//!     .serial_number("SN-0001")
//!     .build()?;
//!
//! session.add_observer(Arc::new(Tips));
//! session.connect().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

use super::observer::{DeviceObserver, dispatch};
use crate::codec::{Instance, MethodRegistry};
use crate::config::SessionBuilder;
use crate::error::{Error, Result};
use crate::identifiers::{MessageId, MessageIdSequence};
use crate::protocol::{AckPayload, Direction, Envelope, EnvelopeType, Method, Origin};
use crate::transport::{TransportConnection, TransportObserver};

// ============================================================================
// PendingAck
// ============================================================================

/// Completion of a command sent with [`DeviceSession::send_command_with_ack`].
///
/// Resolves when the device acknowledges the command, or immediately if the
/// device does not support acknowledgements. There is no timeout; wrap
/// [`wait`](Self::wait) in `tokio::time::timeout` if one is needed.
#[derive(Debug)]
pub struct PendingAck {
    id: MessageId,
    receiver: oneshot::Receiver<()>,
}

impl PendingAck {
    /// Id of the acknowledged command.
    #[inline]
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Waits for the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the session was disposed first.
    pub async fn wait(self) -> Result<()> {
        self.receiver.await.map_err(Error::from)
    }
}

// ============================================================================
// SessionParts
// ============================================================================

/// Building blocks of a session, assembled by [`SessionBuilder`].
pub(crate) struct SessionParts {
    pub(crate) transport: TransportConnection,
    pub(crate) registry: Arc<MethodRegistry>,
    pub(crate) origin: Origin,
    pub(crate) send_discovery: bool,
    pub(crate) supports_ack: bool,
}

// ============================================================================
// DeviceSession
// ============================================================================

struct SessionInner {
    transport: TransportConnection,
    registry: Arc<MethodRegistry>,
    origin: Origin,
    ids: MessageIdSequence,
    observers: RwLock<Vec<Arc<dyn DeviceObserver>>>,
    pending_acks: Mutex<FxHashMap<String, oneshot::Sender<()>>>,
    supports_ack: AtomicBool,
    send_discovery: bool,
    bridge: Mutex<Option<Arc<dyn TransportObserver>>>,
}

/// Business-level connection to one payment terminal.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct DeviceSession {
    inner: Arc<SessionInner>,
}

impl DeviceSession {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        let inner = Arc::new(SessionInner {
            transport: parts.transport,
            registry: parts.registry,
            origin: parts.origin,
            ids: MessageIdSequence::new(),
            observers: RwLock::new(Vec::new()),
            pending_acks: Mutex::new(FxHashMap::default()),
            supports_ack: AtomicBool::new(parts.supports_ack),
            send_discovery: parts.send_discovery,
            bridge: Mutex::new(None),
        });

        let bridge: Arc<dyn TransportObserver> = Arc::new(TransportBridge {
            session: Arc::downgrade(&inner),
        });
        inner.transport.add_observer(Arc::clone(&bridge));
        *inner.bridge.lock() = Some(bridge);

        Self { inner }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connects to the device.
    ///
    /// Returns once the socket connection has been started. Readiness is
    /// reported through [`DeviceObserver::on_device_ready`].
    ///
    /// # Errors
    ///
    /// See [`TransportConnection::establish`].
    pub async fn connect(&self) -> Result<()> {
        self.inner.transport.establish().await
    }

    /// Shuts the session down.
    ///
    /// Observers are dropped and pending acknowledgements abandoned; their
    /// [`PendingAck::wait`] returns [`Error::ChannelClosed`].
    pub fn dispose(&self) {
        info!("Disposing device session");
        self.inner.observers.write().clear();
        if let Some(bridge) = self.inner.bridge.lock().take() {
            self.inner.transport.remove_observer(&bridge);
        }
        self.inner.pending_acks.lock().clear();
        self.inner.transport.dispose();
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Subscribes an observer.
    pub fn add_observer(&self, observer: Arc<dyn DeviceObserver>) {
        self.inner.observers.write().push(observer);
    }

    /// Unsubscribes an observer. Returns `true` if it was subscribed.
    pub fn remove_observer(&self, observer: &Arc<dyn DeviceObserver>) -> bool {
        let mut observers = self.inner.observers.write();
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Underlying transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &TransportConnection {
        &self.inner.transport
    }

    /// Payload registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &MethodRegistry {
        &self.inner.registry
    }

    /// Routing fields stamped on outbound envelopes.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.inner.origin
    }

    /// Returns `true` once the device advertised acknowledgement support.
    #[must_use]
    pub fn supports_acknowledgement(&self) -> bool {
        self.inner.supports_ack.load(Ordering::SeqCst)
    }

    /// Id of the last command sent.
    #[must_use]
    pub fn last_message_id(&self) -> Option<MessageId> {
        self.inner.ids.last()
    }

    /// Number of commands waiting for an acknowledgement.
    #[must_use]
    pub fn pending_ack_count(&self) -> usize {
        self.inner.pending_acks.lock().len()
    }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Sends a command and returns its message id.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if `method` is only ever sent by the device
    /// - [`Error::ConnectionClosed`] if no socket is open (a reconnect is
    ///   scheduled)
    pub fn send_command(&self, method: Method, payload: &Value) -> Result<MessageId> {
        self.inner.send_command(method, payload)
    }

    /// Sends a command and returns a handle that resolves on its
    /// acknowledgement.
    ///
    /// # Errors
    ///
    /// Same as [`send_command`](Self::send_command).
    pub fn send_command_with_ack(&self, method: Method, payload: &Value) -> Result<PendingAck> {
        self.inner.send_command_with_ack(method, payload)
    }

    /// Sends an already decoded message.
    ///
    /// # Errors
    ///
    /// Same as [`send_command`](Self::send_command).
    pub fn send_instance(&self, method: Method, message: &Instance) -> Result<MessageId> {
        self.send_command(method, &message.to_json())
    }

    // ========================================================================
    // Session Commands
    // ========================================================================

    /// Asks the device to describe itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn discovery_request(&self) -> Result<MessageId> {
        self.send_command(
            Method::DiscoveryRequest,
            &json!({ "supportsOrderModification": false }),
        )
    }

    /// Interrupts the current device flow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn break_flow(&self) -> Result<MessageId> {
        self.send_command(Method::Break, &json!({}))
    }

    /// Returns the device to its idle screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn reset(&self) -> Result<MessageId> {
        self.send_command(Method::Reset, &json!({}))
    }

    /// Asks the device to replay the result of the last request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn last_message_request(&self) -> Result<MessageId> {
        self.send_command(Method::LastMsgRequest, &json!({}))
    }

    /// Asks for the device state; with `send_last_message` the device also
    /// replays its last response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn retrieve_device_status(&self, send_last_message: bool) -> Result<MessageId> {
        self.send_command(
            Method::RetrieveDeviceStatusRequest,
            &json!({ "sendLastMessage": send_last_message }),
        )
    }

    /// Presses a button on the device, e.g. `"ENTER"` or `"ESC"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn key_press(&self, key: &str) -> Result<MessageId> {
        self.send_command(Method::KeyPress, &json!({ "keyPress": key }))
    }

    // ========================================================================
    // Screens
    // ========================================================================

    /// Shows the welcome screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn show_welcome_screen(&self) -> Result<MessageId> {
        self.send_command(Method::ShowWelcomeScreen, &json!({}))
    }

    /// Shows the thank-you screen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn show_thank_you_screen(&self) -> Result<MessageId> {
        self.send_command(Method::ShowThankYouScreen, &json!({}))
    }

    /// Shows a free-text message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn show_message(&self, text: &str) -> Result<MessageId> {
        self.send_command(Method::TerminalMessage, &json!({ "text": text }))
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Starts a transaction. `pay_intent` is the loosely typed `PayIntent`
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn tx_start(&self, pay_intent: Value, request_info: Option<&str>) -> Result<MessageId> {
        let mut payload = json!({
            "payIntent": pay_intent,
            "suppressOnScreenTips": false,
        });
        if let Some(info) = request_info {
            payload["requestInfo"] = Value::from(info);
        }
        self.send_command(Method::TxStart, &payload)
    }

    /// Accepts or rejects the signature on `payment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn signature_verified(&self, payment: &Instance, verified: bool) -> Result<MessageId> {
        self.send_command(
            Method::SignatureVerified,
            &json!({ "payment": payment.to_json(), "verified": verified }),
        )
    }

    /// Accepts a challenged payment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn payment_confirmed(&self, payment: &Instance) -> Result<MessageId> {
        self.send_command(
            Method::PaymentConfirmed,
            &json!({ "payment": payment.to_json() }),
        )
    }

    /// Rejects a challenged payment with a void reason such as
    /// `"REJECT_DUPLICATE"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn payment_rejected(&self, payment: &Instance, reason: &str) -> Result<MessageId> {
        self.send_command(
            Method::PaymentRejected,
            &json!({ "payment": payment.to_json(), "reason": reason }),
        )
    }

    /// Voids a payment. Completes when the device acknowledges it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn void_payment(&self, payment: &Value, void_reason: &str) -> Result<PendingAck> {
        self.send_command_with_ack(
            Method::VoidPayment,
            &json!({ "payment": payment, "voidReason": void_reason }),
        )
    }

    /// Refunds a payment. `amount` of `None` refunds in full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn refund_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        amount: Option<i64>,
    ) -> Result<MessageId> {
        let mut payload = json!({
            "orderId": order_id,
            "paymentId": payment_id,
            "fullRefund": amount.is_none(),
        });
        if let Some(amount) = amount {
            payload["amount"] = Value::from(amount);
        }
        self.send_command(Method::RefundRequest, &payload)
    }

    /// Adjusts the tip on a payment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn tip_adjust(&self, order_id: &str, payment_id: &str, tip_amount: i64) -> Result<MessageId> {
        self.send_command(
            Method::TipAdjust,
            &json!({ "orderId": order_id, "paymentId": payment_id, "tipAmount": tip_amount }),
        )
    }

    /// Captures a pre-authorization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn capture_preauth(&self, payment_id: &str, amount: i64, tip_amount: i64) -> Result<MessageId> {
        self.send_command(
            Method::CapturePreauth,
            &json!({ "paymentId": payment_id, "amount": amount, "tipAmount": tip_amount }),
        )
    }

    /// Closes out the current batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn closeout(&self, allow_open_tabs: bool, batch_id: Option<&str>) -> Result<MessageId> {
        let mut payload = json!({ "allowOpenTabs": allow_open_tabs });
        if let Some(batch_id) = batch_id {
            payload["batchId"] = Value::from(batch_id);
        }
        self.send_command(Method::CloseoutRequest, &payload)
    }

    /// Vaults a card read with the given entry-method bit mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn vault_card(&self, card_entry_methods: i64) -> Result<MessageId> {
        self.send_command(
            Method::VaultCard,
            &json!({ "cardEntryMethods": card_entry_methods }),
        )
    }

    /// Reads card data without charging.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn read_card_data(&self, pay_intent: Value) -> Result<MessageId> {
        self.send_command(Method::CardData, &json!({ "payIntent": pay_intent }))
    }

    /// Lists payments the device has not sent to the server yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn retrieve_pending_payments(&self) -> Result<MessageId> {
        self.send_command(Method::RetrievePendingPayments, &json!({}))
    }

    /// Looks up a payment by its external id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn retrieve_payment(&self, external_payment_id: &str) -> Result<MessageId> {
        self.send_command(
            Method::RetrievePaymentRequest,
            &json!({ "externalPaymentId": external_payment_id }),
        )
    }

    // ========================================================================
    // Printing
    // ========================================================================

    /// Prints lines of text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn print_text<S: AsRef<str>>(&self, lines: &[S]) -> Result<MessageId> {
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        self.send_command(Method::PrintText, &json!({ "textLines": lines }))
    }

    /// Prints a PNG image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn print_image(&self, png: &[u8]) -> Result<MessageId> {
        self.send_command(Method::PrintImage, &json!({ "png": BASE64.encode(png) }))
    }

    /// Prints an image the device downloads itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn print_image_from_url(&self, url: &str) -> Result<MessageId> {
        self.send_command(Method::PrintImage, &json!({ "urlString": url }))
    }

    /// Opens the cash drawer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn open_cash_drawer(&self, reason: &str) -> Result<MessageId> {
        self.send_command(Method::OpenCashDrawer, &json!({ "reason": reason }))
    }

    // ========================================================================
    // Custom Activities
    // ========================================================================

    /// Starts a custom activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn start_activity(
        &self,
        action: &str,
        payload: Option<&str>,
        non_blocking: bool,
    ) -> Result<MessageId> {
        self.send_command(
            Method::ActivityRequest,
            &json!({
                "action": action,
                "payload": payload,
                "nonBlocking": non_blocking,
                "forceLaunch": false,
            }),
        )
    }

    /// Sends a payload into a running custom activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if no socket is open.
    pub fn send_to_activity(&self, action: &str, payload: &str) -> Result<MessageId> {
        self.send_command(
            Method::ActivityMessageToActivity,
            &json!({ "action": action, "payload": payload }),
        )
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("transport", &self.inner.transport)
            .field("last_message_id", &self.inner.ids.last())
            .field("supports_ack", &self.supports_acknowledgement())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SessionInner - Outbound
// ============================================================================

impl SessionInner {
    fn send_command(&self, method: Method, payload: &Value) -> Result<MessageId> {
        let (id, frame) = self.encode(method, payload)?;
        self.transport.send_message(&frame)?;
        debug!(message_id = %id, %method, "Command sent");
        Ok(id)
    }

    fn send_command_with_ack(&self, method: Method, payload: &Value) -> Result<PendingAck> {
        let (id, frame) = self.encode(method, payload)?;
        let (sender, receiver) = oneshot::channel();
        let key = id.to_string();

        let awaiting = self.supports_ack.load(Ordering::SeqCst);
        if awaiting {
            self.pending_acks.lock().insert(key.clone(), sender);
            if let Err(e) = self.transport.send_message(&frame) {
                self.pending_acks.lock().remove(&key);
                return Err(e);
            }
        } else {
            self.transport.send_message(&frame)?;
            let _ = sender.send(());
        }

        debug!(message_id = %id, %method, awaiting, "Command sent");
        Ok(PendingAck { id, receiver })
    }

    fn encode(&self, method: Method, payload: &Value) -> Result<(MessageId, String)> {
        if method.direction() == Direction::Inbound {
            return Err(Error::protocol(format!("{method} is only sent by the device")));
        }

        let id = self.ids.next();
        let body = serde_json::to_string(payload)?;
        let frame = Envelope::command(Some(id), method, body, &self.origin).to_json()?;
        Ok((id, frame))
    }

    fn send_pong(&self) {
        let frame = match Envelope::pong(&self.origin).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to encode pong");
                return;
            }
        };
        if let Err(e) = self.transport.send_message(&frame) {
            debug!(error = %e, "Pong not sent");
        }
    }
}

// ============================================================================
// SessionInner - Inbound
// ============================================================================

impl SessionInner {
    fn handle_frame(&self, text: &str) {
        let envelope = match Envelope::from_json(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Malformed envelope, dropping");
                return;
            }
        };

        match envelope.envelope_type {
            EnvelopeType::Ping => {
                trace!("Ping received");
                self.send_pong();
            }
            EnvelopeType::Pong => trace!("Pong received"),
            EnvelopeType::Command => self.handle_command(&envelope),
        }
    }

    fn handle_command(&self, envelope: &Envelope) {
        let method = match envelope.method_kind() {
            Ok(method) => method,
            Err(e) => {
                warn!(error = %e, "Dropping command");
                return;
            }
        };

        if method == Method::Ack {
            self.handle_ack(envelope);
            return;
        }
        if method.is_pairing() {
            debug!(%method, "Pairing message outside pairing, ignoring");
            return;
        }
        if !method.direction().is_inbound() {
            trace!(%method, "Ignoring echoed outbound method");
            return;
        }

        let message = match self.registry.decode(method, envelope.payload.as_deref()) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, %method, "Undecodable payload, dropping");
                return;
            }
        };

        trace!(%method, message_id = ?envelope.id, "Dispatching command");
        let observers = self.observers.read().clone();

        if method == Method::DiscoveryResponse {
            if let Some(supported) = message.get_bool("supportsAcknowledgement") {
                self.supports_ack.store(supported, Ordering::SeqCst);
            }
            for observer in &observers {
                dispatch(observer.as_ref(), method, &message);
            }
            if message.get_bool("ready") == Some(true) {
                info!(
                    serial = message.get_str("serial").unwrap_or_default(),
                    "Device ready"
                );
                for observer in &observers {
                    observer.on_device_ready(&message);
                }
            }
            return;
        }

        for observer in &observers {
            dispatch(observer.as_ref(), method, &message);
        }
    }

    fn handle_ack(&self, envelope: &Envelope) {
        let ack = match envelope.parse_payload::<AckPayload>() {
            Ok(ack) => ack,
            Err(e) => {
                warn!(error = %e, "Malformed acknowledgement, dropping");
                return;
            }
        };

        let pending = self.pending_acks.lock().remove(&ack.source_message_id);
        match pending {
            Some(sender) => {
                debug!(message_id = %ack.source_message_id, "Command acknowledged");
                let _ = sender.send(());
            }
            None => trace!(message_id = %ack.source_message_id, "Acknowledgement without waiter"),
        }

        let observers = self.observers.read().clone();
        for observer in &observers {
            observer.on_message_ack(&ack.source_message_id);
        }
    }

    fn notify(&self, f: impl Fn(&dyn DeviceObserver)) {
        let observers = self.observers.read().clone();
        for observer in &observers {
            f(observer.as_ref());
        }
    }
}

// ============================================================================
// TransportBridge
// ============================================================================

/// Feeds transport events into the session.
struct TransportBridge {
    session: Weak<SessionInner>,
}

impl TransportObserver for TransportBridge {
    fn on_connected(&self) {
        if let Some(session) = self.session.upgrade() {
            session.notify(|o| o.on_device_connected());
        }
    }

    fn on_ready(&self) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if session.send_discovery {
            let payload = json!({ "supportsOrderModification": false });
            if let Err(e) = session.send_command(Method::DiscoveryRequest, &payload) {
                warn!(error = %e, "Discovery request not sent");
            }
        }
    }

    fn on_disconnected(&self) {
        if let Some(session) = self.session.upgrade() {
            session.notify(|o| o.on_device_disconnected());
        }
    }

    fn on_message(&self, text: &str) {
        if let Some(session) = self.session.upgrade() {
            session.handle_frame(text);
        }
    }

    fn on_connection_error(&self, error: &Error) {
        if let Some(session) = self.session.upgrade() {
            session.notify(|o| o.on_device_error(error));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::testing::{MockAdapter, MockSocket, RecordingDeviceObserver, command_frame};

    const URL: &str = "ws://terminal:12345/remote_pay";

    struct Harness {
        session: DeviceSession,
        socket: Arc<MockAdapter>,
        observer: Arc<RecordingDeviceObserver>,
    }

    /// Builds a session and drives it through pairing.
    fn paired() -> Harness {
        let mock = MockSocket::new();
        let session = DeviceSession::builder()
            .endpoint(URL)
            .application_id("com.example.pos:1.0")
            .package_name("com.example.pos")
            .source_sdk("sdk:1.0")
            .pos_name("Register 1")
            .serial_number("SN-1")
            .socket_factory(mock.factory())
            .build()
            .expect("session");
        let observer = Arc::new(RecordingDeviceObserver::default());
        session.add_observer(observer.clone());

        session.transport().initialize(URL).expect("initialize");
        let socket = mock.last().expect("socket");
        socket.open();
        socket.receive(&command_frame(
            "PAIRING_RESPONSE",
            &json!({"pairingState": "PAIRED", "authenticationToken": "tok"}),
        ));

        Harness {
            session,
            socket,
            observer,
        }
    }

    fn commands(socket: &MockAdapter) -> Vec<Envelope> {
        socket
            .sent()
            .iter()
            .filter_map(|frame| Envelope::from_json(frame).ok())
            .filter(|e| e.is_command() && e.method.as_deref() != Some("PAIRING_REQUEST"))
            .collect()
    }

    fn enable_acks(h: &Harness) {
        h.socket.receive(&command_frame(
            "DISCOVERY_RESPONSE",
            &json!({"ready": true, "supportsAcknowledgement": true, "serial": "C0001"}),
        ));
    }

    #[test]
    fn test_ready_sends_discovery_request() {
        let h = paired();
        let sent = commands(&h.socket);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method.as_deref(), Some("DISCOVERY_REQUEST"));
        assert_eq!(sent[0].id.as_deref(), Some("1"));
        assert_eq!(sent[0].package_name, "com.example.pos");
        assert_eq!(sent[0].application_id, "com.example.pos:1.0");
        assert_eq!(sent[0].source_sdk, "sdk:1.0");
        assert_eq!(h.observer.count("connected"), 1);
    }

    #[test]
    fn test_ping_answered_with_pong() {
        let h = paired();
        let before = h.socket.sent().len();

        h.socket.receive(
            r#"{"type":"PING","packageName":"p","applicationId":"a","remoteSourceSDK":"s"}"#,
        );

        let sent = h.socket.sent();
        assert_eq!(sent.len(), before + 1);
        let pong = Envelope::from_json(&sent[before]).expect("pong");
        assert_eq!(pong.envelope_type, EnvelopeType::Pong);
        assert_eq!(pong.package_name, "com.example.pos");
        assert_eq!(pong.application_id, "com.example.pos:1.0");
        assert!(pong.payload.is_none());
        assert!(pong.method.is_none());
    }

    #[test]
    fn test_discovery_enables_acks_and_signals_ready() {
        let h = paired();
        assert!(!h.session.supports_acknowledgement());

        enable_acks(&h);

        assert!(h.session.supports_acknowledgement());
        assert_eq!(h.observer.count("discovery_response"), 1);
        assert_eq!(h.observer.count("device_ready"), 1);
    }

    #[test]
    fn test_inbound_command_dispatched_decoded() {
        let h = paired();
        h.socket
            .receive(&command_frame("TIP_ADDED", &json!({"tipAmount": 150, "extra": "x"})));

        let message = h.observer.last("tip_added").expect("tip dispatched");
        assert_eq!(message, json!({"tipAmount": 150, "extra": "x"}));
    }

    #[test]
    fn test_unknown_and_echoed_methods_dropped() {
        let h = paired();
        h.socket.receive(&command_frame("NOT_A_METHOD", &json!({})));
        h.socket.receive(&command_frame("SHOW_WELCOME_SCREEN", &json!({})));
        h.socket.receive("{not json");

        assert!(h.observer.names().iter().all(|n| n == "connected"));
        assert!(h.session.transport().is_open());
    }

    #[tokio::test]
    async fn test_ack_resolves_pending_command() {
        let h = paired();
        enable_acks(&h);

        let pending = h
            .session
            .void_payment(&json!({"id": "P1"}), "USER_CANCEL")
            .expect("sent");
        assert_eq!(h.session.pending_ack_count(), 1);

        let id = pending.id().to_string();
        h.socket
            .receive(&command_frame("ACK", &json!({"sourceMessageId": id.clone()})));

        pending.wait().await.expect("acknowledged");
        assert_eq!(h.session.pending_ack_count(), 0);
        assert_eq!(h.observer.acks(), vec![id]);
    }

    #[test]
    fn test_pending_ack_waits_for_matching_ack() {
        let h = paired();
        enable_acks(&h);

        let pending = h
            .session
            .void_payment(&json!({"id": "P2"}), "USER_CANCEL")
            .expect("sent");
        let id = pending.id().to_string();
        let mut wait = tokio_test::task::spawn(pending.wait());
        tokio_test::assert_pending!(wait.poll());

        h.socket
            .receive(&command_frame("ACK", &json!({"sourceMessageId": "unrelated"})));
        tokio_test::assert_pending!(wait.poll());

        h.socket
            .receive(&command_frame("ACK", &json!({"sourceMessageId": id})));
        assert!(wait.is_woken());
        tokio_test::assert_ready_ok!(wait.poll());
    }

    #[tokio::test]
    async fn test_ack_completes_immediately_without_support() {
        let h = paired();
        let pending = h
            .session
            .void_payment(&json!({"id": "P1"}), "USER_CANCEL")
            .expect("sent");
        assert_eq!(h.session.pending_ack_count(), 0);
        pending.wait().await.expect("completed");
    }

    #[test]
    fn test_unmatched_ack_still_forwarded() {
        let h = paired();
        h.socket
            .receive(&command_frame("ACK", &json!({"sourceMessageId": "99"})));
        assert_eq!(h.observer.acks(), vec!["99".to_string()]);
    }

    #[tokio::test]
    async fn test_dispose_abandons_pending_acks() {
        let h = paired();
        enable_acks(&h);
        let pending = h
            .session
            .void_payment(&json!({"id": "P1"}), "USER_CANCEL")
            .expect("sent");

        h.session.dispose();

        assert!(matches!(pending.wait().await, Err(Error::ChannelClosed(_))));
        assert!(matches!(
            h.session.show_welcome_screen(),
            Err(Error::ConnectionClosed)
        ));
        // Observers were dropped with the session.
        h.socket.receive(&command_frame("TIP_ADDED", &json!({"tipAmount": 1})));
        assert!(h.observer.last("tip_added").is_none());
    }

    #[test]
    fn test_device_only_method_rejected() {
        let h = paired();
        assert!(matches!(
            h.session.send_command(Method::TipAdded, &json!({})),
            Err(Error::Protocol { .. })
        ));
    }

    #[test]
    fn test_print_image_is_base64() {
        let h = paired();
        h.session.print_image(&[0x89, b'P', b'N', b'G']).expect("sent");

        let last = commands(&h.socket).pop().expect("command");
        assert_eq!(last.method.as_deref(), Some("PRINT_IMAGE"));
        let body: Value = last.parse_payload().expect("payload");
        assert_eq!(body, json!({"png": "iVBORw=="}));
    }

    proptest! {
        #[test]
        fn prop_message_ids_strictly_increase_from_one(count in 1usize..40) {
            let h = paired();
            for _ in 0..count {
                h.session.show_welcome_screen().expect("sent");
            }

            let ids: Vec<u64> = commands(&h.socket)
                .iter()
                .filter_map(|e| e.id.as_deref()?.parse().ok())
                .collect();
            prop_assert_eq!(ids.len(), count + 1);
            let expected: Vec<u64> = (1..=count as u64 + 1).collect();
            prop_assert_eq!(ids, expected);
        }
    }
}
