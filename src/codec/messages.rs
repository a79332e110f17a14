//! Message schemas, one per method.
//!
//! [`descriptor_for`] maps every [`Method`] to the schema of its payload.
//! The match is exhaustive, so adding a method without a schema fails to
//! compile.

use super::models::*;
use super::schema::{Field, TypeDescriptor};
use crate::protocol::Method;

macro_rules! message {
    ($(#[$doc:meta])* $ident:ident = $name:literal { $($field:expr),* $(,)? }) => {
        $(#[$doc])*
        pub static $ident: TypeDescriptor = TypeDescriptor::structure($name, &[$($field),*]);
    };
}

// ============================================================================
// Pairing and session plumbing
// ============================================================================

message!(PAIRING_REQUEST_MESSAGE = "PairingRequestMessage" {
    Field::string("name"),
    Field::string("serialNumber"),
    Field::string("applicationName"),
    Field::string("authenticationToken"),
});

message!(PAIRING_RESPONSE_MESSAGE = "PairingResponseMessage" {
    Field::typed("pairingState", &PAIRING_STATE),
    Field::string("authenticationToken"),
});

message!(PAIRING_CODE_MESSAGE = "PairingCodeMessage" {
    Field::string("pairingCode"),
});

message!(ACK_MESSAGE = "AcknowledgementMessage" {
    Field::string("sourceMessageId"),
});

message!(DISCOVERY_REQUEST_MESSAGE = "DiscoveryRequestMessage" {
    Field::boolean("supportsOrderModification"),
});

message!(
    /// Device description, including the capabilities the session
    /// negotiates on.
    DISCOVERY_RESPONSE_MESSAGE = "DiscoveryResponseMessage" {
        Field::string("merchantId"),
        Field::string("merchantName"),
        Field::string("merchantMId"),
        Field::string("name"),
        Field::string("serial"),
        Field::string("model"),
        Field::boolean("ready"),
        Field::boolean("supportsTipAdjust"),
        Field::boolean("supportsManualRefund"),
        Field::boolean("supportsMultiPayToken"),
        Field::boolean("supportsAcknowledgement"),
        Field::boolean("supportsRemoteConfirmation"),
        Field::boolean("supportsNakedCredit"),
        Field::boolean("supportsVoidPaymentResponse"),
        Field::boolean("supportsPreAuth"),
        Field::boolean("supportsAuth"),
        Field::boolean("supportsVaultCard"),
        Field::boolean("supportsCustomActivities"),
    }
);

message!(UI_STATE_MESSAGE = "UiStateMessage" {
    Field::typed("uiState", &UI_STATE),
    Field::string("uiText"),
    Field::typed("uiDirection", &UI_DIRECTION),
    Field::array("inputOptions", &INPUT_OPTION),
});

message!(TX_STATE_MESSAGE = "TxStateMessage" {
    Field::typed("txState", &TX_STATE),
});

message!(LAST_MESSAGE_REQUEST_MESSAGE = "LastMessageRequestMessage" {});

message!(LAST_MESSAGE_RESPONSE_MESSAGE = "LastMessageResponseMessage" {
    Field::object("request"),
    Field::object("response"),
});

message!(REMOTE_ERROR_MESSAGE = "RemoteErrorMessage" {
    Field::string("code"),
    Field::string("message"),
    Field::string("errorType"),
});

message!(INVALID_STATE_TRANSITION_MESSAGE = "InvalidStateTransitionMessage" {
    Field::string("requestedTransition"),
    Field::typed("state", &EXTERNAL_DEVICE_STATE),
    Field::string("substate"),
    Field::object("data"),
});

message!(BREAK_MESSAGE = "BreakMessage" {});

message!(RESET_MESSAGE = "ResetMessage" {});

message!(SHUTDOWN_MESSAGE = "ShutdownMessage" {});

message!(LOG_MESSAGE = "LogMessage" {
    Field::string("logLevel"),
    Field::object("messages"),
});

// ============================================================================
// Transactions
// ============================================================================

message!(TX_START_REQUEST_MESSAGE = "TxStartRequestMessage" {
    Field::typed("payIntent", &PAY_INTENT),
    Field::typed("order", &ORDER),
    Field::boolean("suppressOnScreenTips"),
    Field::string("requestInfo"),
});

message!(TX_START_RESPONSE_MESSAGE = "TxStartResponseMessage" {
    Field::typed("result", &TX_START_RESPONSE_RESULT),
    Field::string("externalPaymentId"),
    Field::boolean("success"),
    Field::string("requestInfo"),
    Field::string("message"),
    Field::string("reason"),
});

message!(FINISH_OK_MESSAGE = "FinishOkMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("credit", &CREDIT),
    Field::typed("refund", &REFUND),
    Field::typed("signature", &SIGNATURE),
    Field::string("requestInfo"),
});

message!(FINISH_CANCEL_MESSAGE = "FinishCancelMessage" {
    Field::string("requestInfo"),
});

message!(VERIFY_SIGNATURE_MESSAGE = "VerifySignatureMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("signature", &SIGNATURE),
});

message!(SIGNATURE_VERIFIED_MESSAGE = "SignatureVerifiedMessage" {
    Field::typed("payment", &PAYMENT),
    Field::boolean("verified"),
});

message!(PARTIAL_AUTH_MESSAGE = "PartialAuthMessage" {
    Field::number("partialAuthAmount"),
});

message!(CONFIRM_PAYMENT_MESSAGE = "ConfirmPaymentMessage" {
    Field::typed("payment", &PAYMENT),
    Field::array("challenges", &CHALLENGE),
});

message!(PAYMENT_CONFIRMED_MESSAGE = "PaymentConfirmedMessage" {
    Field::typed("payment", &PAYMENT),
});

message!(PAYMENT_REJECTED_MESSAGE = "PaymentRejectedMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("reason", &VOID_REASON),
});

message!(PAYMENT_VOIDED_MESSAGE = "PaymentVoidedMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("voidReason", &VOID_REASON),
    Field::typed("result", &RESULT_STATUS),
    Field::string("reason"),
    Field::string("message"),
});

message!(VOID_PAYMENT_MESSAGE = "VoidPaymentMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("voidReason", &VOID_REASON),
    Field::boolean("disableCloverPrinting"),
    Field::boolean("disableReceiptSelection"),
});

message!(VOID_PAYMENT_RESPONSE_MESSAGE = "VoidPaymentResponseMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("voidReason", &VOID_REASON),
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::string("message"),
});

message!(REFUND_REQUEST_MESSAGE = "RefundRequestMessage" {
    Field::string("orderId"),
    Field::string("paymentId"),
    Field::number("amount"),
    Field::boolean("fullRefund"),
    Field::boolean("disableCloverPrinting"),
    Field::boolean("disableReceiptSelection"),
});

message!(REFUND_RESPONSE_MESSAGE = "RefundResponseMessage" {
    Field::string("orderId"),
    Field::string("paymentId"),
    Field::typed("refund", &REFUND),
    Field::typed("code", &TX_STATE),
    Field::string("reason"),
    Field::string("message"),
});

message!(TIP_ADDED_MESSAGE = "TipAddedMessage" {
    Field::number("tipAmount"),
});

message!(TIP_ADJUST_MESSAGE = "TipAdjustMessage" {
    Field::string("orderId"),
    Field::string("paymentId"),
    Field::number("tipAmount"),
});

message!(TIP_ADJUST_RESPONSE_MESSAGE = "TipAdjustResponseMessage" {
    Field::string("paymentId"),
    Field::number("amount"),
    Field::boolean("success"),
});

message!(CAPTURE_PREAUTH_MESSAGE = "CapturePreAuthMessage" {
    Field::string("paymentId"),
    Field::number("amount"),
    Field::number("tipAmount"),
});

message!(CAPTURE_PREAUTH_RESPONSE_MESSAGE = "CapturePreAuthResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::string("paymentId"),
    Field::number("amount"),
    Field::number("tipAmount"),
});

message!(CASHBACK_SELECTED_MESSAGE = "CashbackSelectedMessage" {
    Field::number("cashbackAmount"),
});

message!(CLOSEOUT_REQUEST_MESSAGE = "CloseoutRequestMessage" {
    Field::boolean("allowOpenTabs"),
    Field::string("batchId"),
});

message!(CLOSEOUT_RESPONSE_MESSAGE = "CloseoutResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::typed("batch", &BATCH),
});

message!(VAULT_CARD_MESSAGE = "VaultCardMessage" {
    Field::number("cardEntryMethods"),
});

message!(VAULT_CARD_RESPONSE_MESSAGE = "VaultCardResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::typed("card", &VAULTED_CARD),
});

message!(CARD_DATA_REQUEST_MESSAGE = "CardDataRequestMessage" {
    Field::typed("payIntent", &PAY_INTENT),
});

message!(CARD_DATA_RESPONSE_MESSAGE = "CardDataResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::typed("cardData", &CARD_DATA),
});

message!(RETRIEVE_PENDING_PAYMENTS_MESSAGE = "RetrievePendingPaymentsMessage" {});

message!(RETRIEVE_PENDING_PAYMENTS_RESPONSE_MESSAGE = "RetrievePendingPaymentsResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::array("pendingPaymentEntries", &PENDING_PAYMENT_ENTRY),
});

message!(RETRIEVE_PAYMENT_REQUEST_MESSAGE = "RetrievePaymentRequestMessage" {
    Field::string("externalPaymentId"),
});

message!(RETRIEVE_PAYMENT_RESPONSE_MESSAGE = "RetrievePaymentResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
    Field::typed("queryStatus", &QUERY_STATUS),
    Field::typed("payment", &PAYMENT),
    Field::string("externalPaymentId"),
});

// ============================================================================
// Device status and input
// ============================================================================

message!(RETRIEVE_DEVICE_STATUS_REQUEST_MESSAGE = "RetrieveDeviceStatusRequestMessage" {
    Field::boolean("sendLastMessage"),
});

message!(RETRIEVE_DEVICE_STATUS_RESPONSE_MESSAGE = "RetrieveDeviceStatusResponseMessage" {
    Field::typed("result", &RESULT_STATUS),
    Field::typed("state", &EXTERNAL_DEVICE_STATE),
    Field::string("substate"),
    Field::object("data"),
});

message!(RESET_DEVICE_RESPONSE_MESSAGE = "ResetDeviceResponseMessage" {
    Field::typed("result", &RESULT_STATUS),
    Field::string("reason"),
    Field::typed("state", &EXTERNAL_DEVICE_STATE),
});

message!(KEY_PRESS_MESSAGE = "KeyPressMessage" {
    Field::typed("keyPress", &KEY_PRESS),
});

// ============================================================================
// Screens and order display
// ============================================================================

message!(WELCOME_MESSAGE = "WelcomeMessage" {});

message!(THANK_YOU_MESSAGE = "ThankYouMessage" {});

message!(ORDER_UPDATE_MESSAGE = "OrderUpdateMessage" {
    Field::typed("order", &DISPLAY_ORDER),
    Field::object("lineItemsAddedOperation"),
    Field::object("lineItemsDeletedOperation"),
    Field::object("discountsAddedOperation"),
    Field::object("discountsDeletedOperation"),
    Field::object("orderDeletedOperation"),
});

message!(TERMINAL_MESSAGE = "TerminalMessage" {
    Field::string("text"),
});

message!(SHOW_PAYMENT_RECEIPT_OPTIONS_MESSAGE = "ShowPaymentReceiptOptionsMessage" {
    Field::string("orderId"),
    Field::string("paymentId"),
    Field::boolean("disablePrinting"),
});

message!(SHOW_REFUND_RECEIPT_OPTIONS_MESSAGE = "ShowRefundReceiptOptionsMessage" {
    Field::string("orderId"),
    Field::string("refundId"),
    Field::boolean("disablePrinting"),
});

message!(SHOW_CREDIT_RECEIPT_OPTIONS_MESSAGE = "ShowCreditReceiptOptionsMessage" {
    Field::string("orderId"),
    Field::string("creditId"),
    Field::boolean("disablePrinting"),
});

message!(DISPLAY_RECEIPT_OPTIONS_RESPONSE_MESSAGE = "DisplayReceiptOptionsResponseMessage" {
    Field::typed("status", &RESULT_STATUS),
    Field::string("reason"),
});

message!(ORDER_ACTION_ADD_DISCOUNT_MESSAGE = "OrderActionAddDiscountMessage" {
    Field::typed("addDiscountAction", &DISPLAY_DISCOUNT),
    Field::typed("order", &DISPLAY_ORDER),
});

message!(ORDER_ACTION_REMOVE_DISCOUNT_MESSAGE = "OrderActionRemoveDiscountMessage" {
    Field::typed("removeDiscountAction", &DISPLAY_DISCOUNT),
    Field::typed("order", &DISPLAY_ORDER),
});

message!(ORDER_ACTION_ADD_LINE_ITEM_MESSAGE = "OrderActionAddLineItemMessage" {
    Field::typed("addLineItemAction", &DISPLAY_LINE_ITEM),
    Field::typed("order", &DISPLAY_ORDER),
});

message!(ORDER_ACTION_REMOVE_LINE_ITEM_MESSAGE = "OrderActionRemoveLineItemMessage" {
    Field::typed("removeLineItemAction", &DISPLAY_LINE_ITEM),
    Field::typed("order", &DISPLAY_ORDER),
});

message!(ORDER_ACTION_RESPONSE_MESSAGE = "OrderActionResponseMessage" {
    Field::boolean("accepted"),
    Field::string("reason"),
});

// ============================================================================
// Printing
// ============================================================================

message!(TEXT_PRINT_MESSAGE = "TextPrintMessage" {
    Field::object("textLines"),
    Field::string("printRequestId"),
    Field::string("printDeviceId"),
});

message!(IMAGE_PRINT_MESSAGE = "ImagePrintMessage" {
    Field::string("png"),
    Field::string("urlString"),
    Field::string("printRequestId"),
    Field::string("printDeviceId"),
});

message!(OPEN_CASH_DRAWER_MESSAGE = "OpenCashDrawerMessage" {
    Field::string("reason"),
    Field::string("deviceId"),
});

message!(CREDIT_PRINT_MESSAGE = "CreditPrintMessage" {
    Field::typed("credit", &CREDIT),
});

message!(DECLINE_CREDIT_PRINT_MESSAGE = "DeclineCreditPrintMessage" {
    Field::typed("credit", &CREDIT),
    Field::string("reason"),
});

message!(PAYMENT_PRINT_MESSAGE = "PaymentPrintMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("order", &ORDER),
});

message!(DECLINE_PAYMENT_PRINT_MESSAGE = "DeclinePaymentPrintMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("order", &ORDER),
    Field::string("reason"),
});

message!(PAYMENT_PRINT_MERCHANT_COPY_MESSAGE = "PaymentPrintMerchantCopyMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("order", &ORDER),
});

message!(REFUND_PAYMENT_PRINT_MESSAGE = "RefundPaymentPrintMessage" {
    Field::typed("payment", &PAYMENT),
    Field::typed("refund", &REFUND),
    Field::typed("order", &ORDER),
});

message!(PRINT_JOB_STATUS_REQUEST_MESSAGE = "PrintJobStatusRequestMessage" {
    Field::string("printRequestId"),
});

message!(PRINT_JOB_STATUS_RESPONSE_MESSAGE = "PrintJobStatusResponseMessage" {
    Field::string("externalPrintJobId"),
    Field::typed("status", &PRINT_JOB_STATUS),
});

message!(RETRIEVE_PRINTERS_REQUEST_MESSAGE = "RetrievePrintersRequestMessage" {
    Field::typed("category", &PRINTER_CATEGORY),
});

message!(RETRIEVE_PRINTERS_RESPONSE_MESSAGE = "RetrievePrintersResponseMessage" {
    Field::array("printers", &PRINTER),
});

// ============================================================================
// Custom activities and customer data
// ============================================================================

message!(ACTIVITY_REQUEST_MESSAGE = "ActivityRequest" {
    Field::string("action"),
    Field::string("payload"),
    Field::boolean("nonBlocking"),
    Field::boolean("forceLaunch"),
});

message!(ACTIVITY_RESPONSE_MESSAGE = "ActivityResponseMessage" {
    Field::string("action"),
    Field::string("payload"),
    Field::number("resultCode"),
    Field::string("failReason"),
});

message!(ACTIVITY_MESSAGE_TO_ACTIVITY = "ActivityMessageToActivity" {
    Field::string("action"),
    Field::string("payload"),
});

message!(ACTIVITY_MESSAGE_FROM_ACTIVITY = "ActivityMessageFromActivity" {
    Field::string("action"),
    Field::string("payload"),
});

message!(REGISTER_FOR_CUSTOMER_DATA_MESSAGE = "RegisterForCustomerProvidedDataMessage" {
    Field::object("configurations"),
});

message!(SET_CUSTOMER_INFO_MESSAGE = "SetCustomerInfoMessage" {
    Field::typed("customerInfo", &CUSTOMER_INFO),
});

message!(CUSTOMER_PROVIDED_DATA_MESSAGE = "CustomerProvidedDataMessage" {
    Field::string("eventId"),
    Field::object("config"),
    Field::string("data"),
});

message!(CUSTOMER_INFO_MESSAGE = "CustomerInfoMessage" {
    Field::typed("customer", &CUSTOMER_INFO),
});

// ============================================================================
// Lookup
// ============================================================================

/// Returns the payload schema of `method`.
#[must_use]
pub fn descriptor_for(method: Method) -> &'static TypeDescriptor {
    match method {
        Method::PairingRequest => &PAIRING_REQUEST_MESSAGE,
        Method::PairingResponse => &PAIRING_RESPONSE_MESSAGE,
        Method::PairingCode => &PAIRING_CODE_MESSAGE,
        Method::Ack => &ACK_MESSAGE,
        Method::DiscoveryRequest => &DISCOVERY_REQUEST_MESSAGE,
        Method::DiscoveryResponse => &DISCOVERY_RESPONSE_MESSAGE,
        Method::UiState => &UI_STATE_MESSAGE,
        Method::TxState => &TX_STATE_MESSAGE,
        Method::LastMsgRequest => &LAST_MESSAGE_REQUEST_MESSAGE,
        Method::LastMsgResponse => &LAST_MESSAGE_RESPONSE_MESSAGE,
        Method::RemoteError => &REMOTE_ERROR_MESSAGE,
        Method::InvalidStateTransition => &INVALID_STATE_TRANSITION_MESSAGE,
        Method::Break => &BREAK_MESSAGE,
        Method::Reset => &RESET_MESSAGE,
        Method::Shutdown => &SHUTDOWN_MESSAGE,
        Method::LogMessage => &LOG_MESSAGE,
        Method::TxStart => &TX_START_REQUEST_MESSAGE,
        Method::TxStartResponse => &TX_START_RESPONSE_MESSAGE,
        Method::FinishOk => &FINISH_OK_MESSAGE,
        Method::FinishCancel => &FINISH_CANCEL_MESSAGE,
        Method::VerifySignature => &VERIFY_SIGNATURE_MESSAGE,
        Method::SignatureVerified => &SIGNATURE_VERIFIED_MESSAGE,
        Method::PartialAuth => &PARTIAL_AUTH_MESSAGE,
        Method::ConfirmPaymentMessage => &CONFIRM_PAYMENT_MESSAGE,
        Method::PaymentConfirmed => &PAYMENT_CONFIRMED_MESSAGE,
        Method::PaymentRejected => &PAYMENT_REJECTED_MESSAGE,
        Method::PaymentVoided => &PAYMENT_VOIDED_MESSAGE,
        Method::VoidPayment => &VOID_PAYMENT_MESSAGE,
        Method::VoidPaymentResponse => &VOID_PAYMENT_RESPONSE_MESSAGE,
        Method::RefundRequest => &REFUND_REQUEST_MESSAGE,
        Method::RefundResponse => &REFUND_RESPONSE_MESSAGE,
        Method::TipAdded => &TIP_ADDED_MESSAGE,
        Method::TipAdjust => &TIP_ADJUST_MESSAGE,
        Method::TipAdjustResponse => &TIP_ADJUST_RESPONSE_MESSAGE,
        Method::CapturePreauth => &CAPTURE_PREAUTH_MESSAGE,
        Method::CapturePreauthResponse => &CAPTURE_PREAUTH_RESPONSE_MESSAGE,
        Method::CashbackSelected => &CASHBACK_SELECTED_MESSAGE,
        Method::CloseoutRequest => &CLOSEOUT_REQUEST_MESSAGE,
        Method::CloseoutResponse => &CLOSEOUT_RESPONSE_MESSAGE,
        Method::VaultCard => &VAULT_CARD_MESSAGE,
        Method::VaultCardResponse => &VAULT_CARD_RESPONSE_MESSAGE,
        Method::CardData => &CARD_DATA_REQUEST_MESSAGE,
        Method::CardDataResponse => &CARD_DATA_RESPONSE_MESSAGE,
        Method::RetrievePendingPayments => &RETRIEVE_PENDING_PAYMENTS_MESSAGE,
        Method::RetrievePendingPaymentsResponse => &RETRIEVE_PENDING_PAYMENTS_RESPONSE_MESSAGE,
        Method::RetrievePaymentRequest => &RETRIEVE_PAYMENT_REQUEST_MESSAGE,
        Method::RetrievePaymentResponse => &RETRIEVE_PAYMENT_RESPONSE_MESSAGE,
        Method::RetrieveDeviceStatusRequest => &RETRIEVE_DEVICE_STATUS_REQUEST_MESSAGE,
        Method::RetrieveDeviceStatusResponse => &RETRIEVE_DEVICE_STATUS_RESPONSE_MESSAGE,
        Method::ResetDeviceResponse => &RESET_DEVICE_RESPONSE_MESSAGE,
        Method::KeyPress => &KEY_PRESS_MESSAGE,
        Method::ShowWelcomeScreen => &WELCOME_MESSAGE,
        Method::ShowThankYouScreen => &THANK_YOU_MESSAGE,
        Method::ShowOrderScreen => &ORDER_UPDATE_MESSAGE,
        Method::TerminalMessage => &TERMINAL_MESSAGE,
        Method::ShowPaymentReceiptOptions => &SHOW_PAYMENT_RECEIPT_OPTIONS_MESSAGE,
        Method::ShowRefundReceiptOptions => &SHOW_REFUND_RECEIPT_OPTIONS_MESSAGE,
        Method::ShowCreditReceiptOptions => &SHOW_CREDIT_RECEIPT_OPTIONS_MESSAGE,
        Method::DisplayReceiptOptionsResponse => &DISPLAY_RECEIPT_OPTIONS_RESPONSE_MESSAGE,
        Method::OrderActionAddDiscount => &ORDER_ACTION_ADD_DISCOUNT_MESSAGE,
        Method::OrderActionRemoveDiscount => &ORDER_ACTION_REMOVE_DISCOUNT_MESSAGE,
        Method::OrderActionAddLineItem => &ORDER_ACTION_ADD_LINE_ITEM_MESSAGE,
        Method::OrderActionRemoveLineItem => &ORDER_ACTION_REMOVE_LINE_ITEM_MESSAGE,
        Method::OrderActionResponse => &ORDER_ACTION_RESPONSE_MESSAGE,
        Method::PrintText => &TEXT_PRINT_MESSAGE,
        Method::PrintImage => &IMAGE_PRINT_MESSAGE,
        Method::OpenCashDrawer => &OPEN_CASH_DRAWER_MESSAGE,
        Method::PrintCredit => &CREDIT_PRINT_MESSAGE,
        Method::PrintCreditDecline => &DECLINE_CREDIT_PRINT_MESSAGE,
        Method::PrintPayment => &PAYMENT_PRINT_MESSAGE,
        Method::PrintPaymentDecline => &DECLINE_PAYMENT_PRINT_MESSAGE,
        Method::PrintPaymentMerchantCopy => &PAYMENT_PRINT_MERCHANT_COPY_MESSAGE,
        Method::RefundPrintPayment => &REFUND_PAYMENT_PRINT_MESSAGE,
        Method::PrintJobStatusRequest => &PRINT_JOB_STATUS_REQUEST_MESSAGE,
        Method::PrintJobStatusResponse => &PRINT_JOB_STATUS_RESPONSE_MESSAGE,
        Method::GetPrintersRequest => &RETRIEVE_PRINTERS_REQUEST_MESSAGE,
        Method::GetPrintersResponse => &RETRIEVE_PRINTERS_RESPONSE_MESSAGE,
        Method::ActivityRequest => &ACTIVITY_REQUEST_MESSAGE,
        Method::ActivityResponse => &ACTIVITY_RESPONSE_MESSAGE,
        Method::ActivityMessageToActivity => &ACTIVITY_MESSAGE_TO_ACTIVITY,
        Method::ActivityMessageFromActivity => &ACTIVITY_MESSAGE_FROM_ACTIVITY,
        Method::RegisterForCustomerData => &REGISTER_FOR_CUSTOMER_DATA_MESSAGE,
        Method::SetCustomerInfo => &SET_CUSTOMER_INFO_MESSAGE,
        Method::CustomerProvidedData => &CUSTOMER_PROVIDED_DATA_MESSAGE,
        Method::CustomerInfo => &CUSTOMER_INFO_MESSAGE,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_method_has_a_structure() {
        for method in Method::ALL {
            let descriptor = descriptor_for(*method);
            assert!(
                descriptor.schema().is_some(),
                "{method} maps to non-structure {}",
                descriptor.name()
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert!(descriptor_for(Method::TipAdded).same(&TIP_ADDED_MESSAGE));
        assert!(descriptor_for(Method::ShowOrderScreen).same(&ORDER_UPDATE_MESSAGE));
        let schema = DISCOVERY_RESPONSE_MESSAGE.schema().expect("structure");
        assert!(schema.field("supportsAcknowledgement").is_some());
    }
}
