//! Business event callbacks.
//!
//! Every device-originated method has a named callback receiving the
//! decoded payload. All callbacks default to no-ops, so an observer only
//! implements what it cares about.
//!
//! | Group | Callbacks |
//! |-------|-----------|
//! | Lifecycle | `on_device_connected`, `on_device_ready`, `on_device_disconnected`, `on_device_error` |
//! | Session | `on_message_ack`, `on_discovery_response`, `on_ui_state`, `on_tx_state`, ... |
//! | Payments | `on_tx_start_response`, `on_finish_ok`, `on_verify_signature`, `on_tip_added`, ... |
//! | Printing | `on_print_payment`, `on_print_job_status_response`, `on_printers_response`, ... |
//! | Activities | `on_activity_response`, `on_message_from_activity` |

// ============================================================================
// Imports
// ============================================================================

use crate::codec::Instance;
use crate::error::Error;
use crate::protocol::Method;

// ============================================================================
// DeviceObserver
// ============================================================================

/// Receives device lifecycle and business events.
///
/// Callbacks run on the task that delivered the frame and must not block.
#[allow(unused_variables)]
pub trait DeviceObserver: Send + Sync {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Socket to the device opened.
    fn on_device_connected(&self) {}

    /// Device answered discovery and is ready for transactions.
    fn on_device_ready(&self, discovery: &Instance) {}

    /// Socket to the device closed.
    fn on_device_disconnected(&self) {}

    /// A connection attempt failed.
    fn on_device_error(&self, error: &Error) {}

    // ========================================================================
    // Session
    // ========================================================================

    /// Device acknowledged the command with this message id.
    fn on_message_ack(&self, source_message_id: &str) {}

    /// `DISCOVERY_RESPONSE`
    fn on_discovery_response(&self, message: &Instance) {}

    /// `UI_STATE`
    fn on_ui_state(&self, message: &Instance) {}

    /// `TX_STATE`
    fn on_tx_state(&self, message: &Instance) {}

    /// `LAST_MSG_RESPONSE`
    fn on_last_message_response(&self, message: &Instance) {}

    /// `REMOTE_ERROR`
    fn on_remote_error(&self, message: &Instance) {}

    /// `INVALID_STATE_TRANSITION`
    fn on_invalid_state_transition(&self, message: &Instance) {}

    /// `RETRIEVE_DEVICE_STATUS_RESPONSE`
    fn on_device_status_response(&self, message: &Instance) {}

    /// `RESET_DEVICE_RESPONSE`
    fn on_reset_device_response(&self, message: &Instance) {}

    // ========================================================================
    // Payments
    // ========================================================================

    /// `TX_START_RESPONSE`
    fn on_tx_start_response(&self, message: &Instance) {}

    /// `FINISH_OK`
    fn on_finish_ok(&self, message: &Instance) {}

    /// `FINISH_CANCEL`
    fn on_finish_cancel(&self, message: &Instance) {}

    /// `VERIFY_SIGNATURE`
    fn on_verify_signature(&self, message: &Instance) {}

    /// `PARTIAL_AUTH`
    fn on_partial_auth(&self, message: &Instance) {}

    /// `CONFIRM_PAYMENT_MESSAGE`
    fn on_confirm_payment(&self, message: &Instance) {}

    /// `PAYMENT_VOIDED`
    fn on_payment_voided(&self, message: &Instance) {}

    /// `VOID_PAYMENT_RESPONSE`
    fn on_void_payment_response(&self, message: &Instance) {}

    /// `REFUND_RESPONSE`
    fn on_refund_response(&self, message: &Instance) {}

    /// `TIP_ADDED`
    fn on_tip_added(&self, message: &Instance) {}

    /// `TIP_ADJUST_RESPONSE`
    fn on_tip_adjust_response(&self, message: &Instance) {}

    /// `CAPTURE_PREAUTH_RESPONSE`
    fn on_capture_preauth_response(&self, message: &Instance) {}

    /// `CASHBACK_SELECTED`
    fn on_cashback_selected(&self, message: &Instance) {}

    /// `CLOSEOUT_RESPONSE`
    fn on_closeout_response(&self, message: &Instance) {}

    /// `VAULT_CARD_RESPONSE`
    fn on_vault_card_response(&self, message: &Instance) {}

    /// `CARD_DATA_RESPONSE`
    fn on_card_data_response(&self, message: &Instance) {}

    /// `RETRIEVE_PENDING_PAYMENTS_RESPONSE`
    fn on_pending_payments_response(&self, message: &Instance) {}

    /// `RETRIEVE_PAYMENT_RESPONSE`
    fn on_retrieve_payment_response(&self, message: &Instance) {}

    /// `DISPLAY_RECEIPT_OPTIONS_RESPONSE`
    fn on_receipt_options_response(&self, message: &Instance) {}

    // ========================================================================
    // Printing
    // ========================================================================

    /// `PRINT_PAYMENT`
    fn on_print_payment(&self, message: &Instance) {}

    /// `PRINT_PAYMENT_DECLINE`
    fn on_print_payment_decline(&self, message: &Instance) {}

    /// `PRINT_PAYMENT_MERCHANT_COPY`
    fn on_print_payment_merchant_copy(&self, message: &Instance) {}

    /// `REFUND_PRINT_PAYMENT`
    fn on_print_refund_payment(&self, message: &Instance) {}

    /// `PRINT_CREDIT`
    fn on_print_credit(&self, message: &Instance) {}

    /// `PRINT_CREDIT_DECLINE`
    fn on_print_credit_decline(&self, message: &Instance) {}

    /// `PRINT_JOB_STATUS_RESPONSE`
    fn on_print_job_status_response(&self, message: &Instance) {}

    /// `GET_PRINTERS_RESPONSE`
    fn on_printers_response(&self, message: &Instance) {}

    // ========================================================================
    // Activities and customer data
    // ========================================================================

    /// `ACTIVITY_RESPONSE`
    fn on_activity_response(&self, message: &Instance) {}

    /// `ACTIVITY_MESSAGE_FROM_ACTIVITY`
    fn on_message_from_activity(&self, message: &Instance) {}

    /// `CUSTOMER_PROVIDED_DATA_MESSAGE`
    fn on_customer_provided_data(&self, message: &Instance) {}

    /// `CUSTOMER_INFO_MESSAGE`
    fn on_customer_info(&self, message: &Instance) {}
}

// ============================================================================
// Dispatch
// ============================================================================

/// Routes a decoded inbound message to its callback.
///
/// Returns `false` for methods without a business callback (pairing,
/// acknowledgements and POS-originated methods).
pub(crate) fn dispatch(observer: &dyn DeviceObserver, method: Method, message: &Instance) -> bool {
    use Method as M;

    match method {
        M::DiscoveryResponse => observer.on_discovery_response(message),
        M::UiState => observer.on_ui_state(message),
        M::TxState => observer.on_tx_state(message),
        M::LastMsgResponse => observer.on_last_message_response(message),
        M::RemoteError => observer.on_remote_error(message),
        M::InvalidStateTransition => observer.on_invalid_state_transition(message),
        M::RetrieveDeviceStatusResponse => observer.on_device_status_response(message),
        M::ResetDeviceResponse => observer.on_reset_device_response(message),

        M::TxStartResponse => observer.on_tx_start_response(message),
        M::FinishOk => observer.on_finish_ok(message),
        M::FinishCancel => observer.on_finish_cancel(message),
        M::VerifySignature => observer.on_verify_signature(message),
        M::PartialAuth => observer.on_partial_auth(message),
        M::ConfirmPaymentMessage => observer.on_confirm_payment(message),
        M::PaymentVoided => observer.on_payment_voided(message),
        M::VoidPaymentResponse => observer.on_void_payment_response(message),
        M::RefundResponse => observer.on_refund_response(message),
        M::TipAdded => observer.on_tip_added(message),
        M::TipAdjustResponse => observer.on_tip_adjust_response(message),
        M::CapturePreauthResponse => observer.on_capture_preauth_response(message),
        M::CashbackSelected => observer.on_cashback_selected(message),
        M::CloseoutResponse => observer.on_closeout_response(message),
        M::VaultCardResponse => observer.on_vault_card_response(message),
        M::CardDataResponse => observer.on_card_data_response(message),
        M::RetrievePendingPaymentsResponse => observer.on_pending_payments_response(message),
        M::RetrievePaymentResponse => observer.on_retrieve_payment_response(message),
        M::DisplayReceiptOptionsResponse => observer.on_receipt_options_response(message),

        M::PrintPayment => observer.on_print_payment(message),
        M::PrintPaymentDecline => observer.on_print_payment_decline(message),
        M::PrintPaymentMerchantCopy => observer.on_print_payment_merchant_copy(message),
        M::RefundPrintPayment => observer.on_print_refund_payment(message),
        M::PrintCredit => observer.on_print_credit(message),
        M::PrintCreditDecline => observer.on_print_credit_decline(message),
        M::PrintJobStatusResponse => observer.on_print_job_status_response(message),
        M::GetPrintersResponse => observer.on_printers_response(message),

        M::ActivityResponse => observer.on_activity_response(message),
        M::ActivityMessageFromActivity => observer.on_message_from_activity(message),
        M::CustomerProvidedData => observer.on_customer_provided_data(message),
        M::CustomerInfo => observer.on_customer_info(message),

        _ => return false,
    }
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl DeviceObserver for Silent {}

    #[test]
    fn test_every_inbound_method_has_a_callback() {
        let message = Instance::untyped();
        for method in Method::ALL {
            let inbound_business = method.direction().is_inbound()
                && !method.is_pairing()
                && *method != Method::Ack;
            assert_eq!(
                dispatch(&Silent, *method, &message),
                inbound_business,
                "{method}"
            );
        }
    }
}
