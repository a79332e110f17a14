//! Method catalog.
//!
//! Every command envelope names the message kind it carries with a
//! `SCREAMING_SNAKE_CASE` method string. Methods are classified by the
//! direction they travel so the session can tell a genuine device event from
//! an echo of something the POS sent.
//!
//! | Direction | Meaning |
//! |-----------|---------|
//! | [`Direction::Inbound`] | Device → POS, dispatched to observers |
//! | [`Direction::Outbound`] | POS → device, silently ignored if echoed back |
//! | [`Direction::Both`] | Travels either way |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

// ============================================================================
// Direction
// ============================================================================

/// Which side of the link originates a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sent by the device.
    Inbound,
    /// Sent by the POS.
    Outbound,
    /// Sent by either side.
    Both,
}

impl Direction {
    /// Returns `true` if the device may originate this method.
    #[inline]
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::Inbound | Self::Both)
    }
}

// ============================================================================
// Method
// ============================================================================

macro_rules! methods {
    ($( $(#[$doc:meta])* $variant:ident => $wire:literal, $dir:ident; )+) => {
        /// Discriminant naming the message kind carried by an envelope.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Method {
            $( $(#[$doc])* $variant, )+
        }

        impl Method {
            /// Every known method, in declaration order.
            pub const ALL: &'static [Method] = &[ $( Method::$variant, )+ ];

            /// Returns the wire name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Method::$variant => $wire, )+
                }
            }

            /// Returns which side originates this method.
            #[must_use]
            pub const fn direction(self) -> Direction {
                match self {
                    $( Method::$variant => Direction::$dir, )+
                }
            }

            /// Looks up a method by wire name.
            #[must_use]
            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $( $wire => Some(Method::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

methods! {
    // Pairing
    /// POS asks to pair, optionally presenting a stored token.
    PairingRequest => "PAIRING_REQUEST", Outbound;
    /// Device reports the pairing outcome.
    PairingResponse => "PAIRING_RESPONSE", Inbound;
    /// Device displays a code the operator must enter on the POS.
    PairingCode => "PAIRING_CODE", Inbound;

    // Session plumbing
    /// Acknowledges a command by message id.
    Ack => "ACK", Both;
    /// POS asks the device to describe itself.
    DiscoveryRequest => "DISCOVERY_REQUEST", Outbound;
    /// Device description and readiness.
    DiscoveryResponse => "DISCOVERY_RESPONSE", Inbound;
    /// Device screen state change.
    UiState => "UI_STATE", Inbound;
    /// Device transaction state change.
    TxState => "TX_STATE", Inbound;
    /// Result of the last request, replayed on demand.
    LastMsgRequest => "LAST_MSG_REQUEST", Outbound;
    /// Response to [`Method::LastMsgRequest`].
    LastMsgResponse => "LAST_MSG_RESPONSE", Inbound;
    /// Device reported an error processing a request.
    RemoteError => "REMOTE_ERROR", Inbound;
    /// Device rejected a request given its current state.
    InvalidStateTransition => "INVALID_STATE_TRANSITION", Inbound;
    /// Interrupts whatever the device is doing.
    Break => "BREAK", Outbound;
    /// Returns the device to its idle state.
    Reset => "RESET", Outbound;
    /// Asks the device to drop the connection.
    Shutdown => "SHUTDOWN", Outbound;
    /// Forwards a POS log line to the device.
    LogMessage => "LOG_MESSAGE", Outbound;

    // Transactions
    /// Starts a sale, auth or pre-auth.
    TxStart => "TX_START", Outbound;
    /// Device accepted or declined a transaction start.
    TxStartResponse => "TX_START_RESPONSE", Inbound;
    /// Transaction finished successfully.
    FinishOk => "FINISH_OK", Inbound;
    /// Transaction was cancelled.
    FinishCancel => "FINISH_CANCEL", Inbound;
    /// Device needs the POS to verify a captured signature.
    VerifySignature => "VERIFY_SIGNATURE", Inbound;
    /// POS verdict on a captured signature.
    SignatureVerified => "SIGNATURE_VERIFIED", Outbound;
    /// Card authorized for less than requested.
    PartialAuth => "PARTIAL_AUTH", Inbound;
    /// Device asks the POS to confirm a payment challenge.
    ConfirmPaymentMessage => "CONFIRM_PAYMENT_MESSAGE", Inbound;
    /// POS accepts a challenged payment.
    PaymentConfirmed => "PAYMENT_CONFIRMED", Outbound;
    /// POS rejects a challenged payment.
    PaymentRejected => "PAYMENT_REJECTED", Outbound;
    /// Device voided a payment on its own.
    PaymentVoided => "PAYMENT_VOIDED", Inbound;
    /// POS asks to void a payment.
    VoidPayment => "VOID_PAYMENT", Outbound;
    /// Response to [`Method::VoidPayment`].
    VoidPaymentResponse => "VOID_PAYMENT_RESPONSE", Inbound;
    /// POS asks to refund a payment.
    RefundRequest => "REFUND_REQUEST", Outbound;
    /// Response to [`Method::RefundRequest`].
    RefundResponse => "REFUND_RESPONSE", Inbound;
    /// Customer added a tip on the device.
    TipAdded => "TIP_ADDED", Inbound;
    /// POS adjusts the tip on a payment.
    TipAdjust => "TIP_ADJUST", Outbound;
    /// Response to [`Method::TipAdjust`].
    TipAdjustResponse => "TIP_ADJUST_RESPONSE", Inbound;
    /// POS captures a pre-authorization.
    CapturePreauth => "CAPTURE_PREAUTH", Outbound;
    /// Response to [`Method::CapturePreauth`].
    CapturePreauthResponse => "CAPTURE_PREAUTH_RESPONSE", Inbound;
    /// Customer selected a cashback amount.
    CashbackSelected => "CASHBACK_SELECTED", Inbound;
    /// POS asks to close out the batch.
    CloseoutRequest => "CLOSEOUT_REQUEST", Outbound;
    /// Response to [`Method::CloseoutRequest`].
    CloseoutResponse => "CLOSEOUT_RESPONSE", Inbound;
    /// POS asks the device to vault a card.
    VaultCard => "VAULT_CARD", Outbound;
    /// Response to [`Method::VaultCard`].
    VaultCardResponse => "VAULT_CARD_RESPONSE", Inbound;
    /// POS asks the device to read card data.
    CardData => "CARD_DATA", Outbound;
    /// Response to [`Method::CardData`].
    CardDataResponse => "CARD_DATA_RESPONSE", Inbound;
    /// POS asks for payments still waiting to be sent.
    RetrievePendingPayments => "RETRIEVE_PENDING_PAYMENTS", Outbound;
    /// Response to [`Method::RetrievePendingPayments`].
    RetrievePendingPaymentsResponse => "RETRIEVE_PENDING_PAYMENTS_RESPONSE", Inbound;
    /// POS looks up a payment by external id.
    RetrievePaymentRequest => "RETRIEVE_PAYMENT_REQUEST", Outbound;
    /// Response to [`Method::RetrievePaymentRequest`].
    RetrievePaymentResponse => "RETRIEVE_PAYMENT_RESPONSE", Inbound;

    // Device status
    /// POS asks for the device state.
    RetrieveDeviceStatusRequest => "RETRIEVE_DEVICE_STATUS_REQUEST", Outbound;
    /// Response to [`Method::RetrieveDeviceStatusRequest`].
    RetrieveDeviceStatusResponse => "RETRIEVE_DEVICE_STATUS_RESPONSE", Inbound;
    /// Device finished a reset.
    ResetDeviceResponse => "RESET_DEVICE_RESPONSE", Inbound;

    // Input
    /// POS presses a button on the device.
    KeyPress => "KEY_PRESS", Outbound;

    // Screens
    /// Shows the welcome screen.
    ShowWelcomeScreen => "SHOW_WELCOME_SCREEN", Outbound;
    /// Shows the thank-you screen.
    ShowThankYouScreen => "SHOW_THANK_YOU_SCREEN", Outbound;
    /// Shows the current order.
    ShowOrderScreen => "SHOW_ORDER_SCREEN", Outbound;
    /// Shows a free-text message.
    TerminalMessage => "TERMINAL_MESSAGE", Outbound;
    /// Shows receipt options for a payment.
    ShowPaymentReceiptOptions => "SHOW_PAYMENT_RECEIPT_OPTIONS", Outbound;
    /// Shows receipt options for a refund.
    ShowRefundReceiptOptions => "SHOW_REFUND_RECEIPT_OPTIONS", Outbound;
    /// Shows receipt options for a manual credit.
    ShowCreditReceiptOptions => "SHOW_CREDIT_RECEIPT_OPTIONS", Outbound;
    /// Receipt option chosen on the device.
    DisplayReceiptOptionsResponse => "DISPLAY_RECEIPT_OPTIONS_RESPONSE", Inbound;

    // Order display
    /// Echo of a discount added to the displayed order.
    OrderActionAddDiscount => "ORDER_ACTION_ADD_DISCOUNT", Outbound;
    /// Echo of a discount removed from the displayed order.
    OrderActionRemoveDiscount => "ORDER_ACTION_REMOVE_DISCOUNT", Outbound;
    /// Echo of a line item added to the displayed order.
    OrderActionAddLineItem => "ORDER_ACTION_ADD_LINE_ITEM", Outbound;
    /// Echo of a line item removed from the displayed order.
    OrderActionRemoveLineItem => "ORDER_ACTION_REMOVE_LINE_ITEM", Outbound;
    /// Result of an order action.
    OrderActionResponse => "ORDER_ACTION_RESPONSE", Outbound;

    // Printing
    /// Prints lines of text.
    PrintText => "PRINT_TEXT", Outbound;
    /// Prints a PNG image.
    PrintImage => "PRINT_IMAGE", Outbound;
    /// Opens the cash drawer.
    OpenCashDrawer => "OPEN_CASH_DRAWER", Outbound;
    /// Device asks the POS to print a manual credit receipt.
    PrintCredit => "PRINT_CREDIT", Inbound;
    /// Device asks the POS to print a declined credit receipt.
    PrintCreditDecline => "PRINT_CREDIT_DECLINE", Inbound;
    /// Device asks the POS to print a payment receipt.
    PrintPayment => "PRINT_PAYMENT", Inbound;
    /// Device asks the POS to print a declined payment receipt.
    PrintPaymentDecline => "PRINT_PAYMENT_DECLINE", Inbound;
    /// Device asks the POS to print the merchant copy.
    PrintPaymentMerchantCopy => "PRINT_PAYMENT_MERCHANT_COPY", Inbound;
    /// Device asks the POS to print a refund receipt.
    RefundPrintPayment => "REFUND_PRINT_PAYMENT", Inbound;
    /// POS asks for the state of a print job.
    PrintJobStatusRequest => "PRINT_JOB_STATUS_REQUEST", Outbound;
    /// Response to [`Method::PrintJobStatusRequest`].
    PrintJobStatusResponse => "PRINT_JOB_STATUS_RESPONSE", Inbound;
    /// POS asks for the attached printers.
    GetPrintersRequest => "GET_PRINTERS_REQUEST", Outbound;
    /// Response to [`Method::GetPrintersRequest`].
    GetPrintersResponse => "GET_PRINTERS_RESPONSE", Inbound;

    // Custom activities
    /// POS starts a custom activity.
    ActivityRequest => "ACTIVITY_REQUEST", Outbound;
    /// Custom activity finished.
    ActivityResponse => "ACTIVITY_RESPONSE", Inbound;
    /// POS sends a payload into a running activity.
    ActivityMessageToActivity => "ACTIVITY_MESSAGE_TO_ACTIVITY", Outbound;
    /// Running activity sends a payload to the POS.
    ActivityMessageFromActivity => "ACTIVITY_MESSAGE_FROM_ACTIVITY", Inbound;

    // Customer data
    /// POS registers for customer data events.
    RegisterForCustomerData => "REGISTER_FOR_CUST_DATA", Outbound;
    /// POS pushes customer info to the display.
    SetCustomerInfo => "SET_CUSTOMER_INFO", Outbound;
    /// Customer provided data on the device.
    CustomerProvidedData => "CUSTOMER_PROVIDED_DATA_MESSAGE", Inbound;
    /// Customer info currently shown on the device.
    CustomerInfo => "CUSTOMER_INFO_MESSAGE", Inbound;
}

impl Method {
    /// Returns `true` for the three methods that drive pairing.
    #[inline]
    #[must_use]
    pub const fn is_pairing(self) -> bool {
        matches!(
            self,
            Self::PairingRequest | Self::PairingResponse | Self::PairingCode
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| Error::unknown_method(s))
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_wire(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown method {name}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(Method::from_wire(method.as_str()), Some(*method));
        }
    }

    #[test]
    fn test_wire_names_are_unique() {
        let mut names: Vec<_> = Method::ALL.iter().map(|m| m.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Method::ALL.len());
    }

    #[test]
    fn test_catalog_size() {
        assert!(Method::ALL.len() >= 80);
    }

    #[test]
    fn test_unknown_method_parse_error() {
        let err = "NOT_A_METHOD".parse::<Method>().unwrap_err();
        assert!(matches!(err, Error::UnknownMethod { .. }));
    }

    #[test]
    fn test_directions() {
        assert!(Method::TipAdded.direction().is_inbound());
        assert!(Method::Ack.direction().is_inbound());
        assert!(!Method::ShowWelcomeScreen.direction().is_inbound());
        assert!(Method::PairingCode.is_pairing());
        assert!(!Method::Ack.is_pairing());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Method::VaultCardResponse).expect("serialize");
        assert_eq!(json, "\"VAULT_CARD_RESPONSE\"");
        let method: Method = serde_json::from_str("\"TIP_ADDED\"").expect("deserialize");
        assert_eq!(method, Method::TipAdded);
    }
}
