//! Domain model schemas carried inside messages.
//!
//! Orders, payments, refunds and the rest are plain data with no behavior
//! in this crate. Their schemas list the fields the message codec needs to
//! give nested values a shape; anything else survives as a raw field.

use super::schema::{Field, TypeDescriptor};

// ============================================================================
// Enumerations
// ============================================================================

/// Payment result.
pub static RESULT: TypeDescriptor = TypeDescriptor::enumeration(
    "Result",
    &[
        "SUCCESS",
        "FAIL",
        "INITIATED",
        "VOIDED",
        "VOIDING",
        "VOID_FAILED",
        "AUTH",
        "AUTH_COMPLETED",
        "DISCOUNT",
        "OFFLINE_RETRYING",
        "PENDING",
    ],
);

/// Outcome of a device-side request.
pub static RESULT_STATUS: TypeDescriptor =
    TypeDescriptor::enumeration("ResultStatus", &["SUCCESS", "FAIL", "CANCEL"]);

/// Card brand.
pub static CARD_TYPE: TypeDescriptor = TypeDescriptor::enumeration(
    "CardType",
    &[
        "VISA",
        "MC",
        "AMEX",
        "DISCOVER",
        "DINERS_CLUB",
        "JCB",
        "MAESTRO",
        "SOLO",
        "LASER",
        "CHINA_UNION_PAY",
        "CARTE_BLANCHE",
        "UNKNOWN",
        "GIFT_CARD",
        "EBT",
        "INTERAC",
        "OTHER",
    ],
);

/// How the card was presented.
pub static CARD_ENTRY_TYPE: TypeDescriptor = TypeDescriptor::enumeration(
    "CardEntryType",
    &[
        "SWIPED",
        "KEYED",
        "VOICE",
        "VAULTED",
        "OFFLINE_SWIPED",
        "OFFLINE_KEYED",
        "EMV_CONTACT",
        "EMV_CONTACTLESS",
        "MSD_CONTACTLESS",
        "PINPAD_MANUAL_ENTRY",
    ],
);

/// Card transaction kind.
pub static CARD_TRANSACTION_TYPE: TypeDescriptor = TypeDescriptor::enumeration(
    "CardTransactionType",
    &[
        "AUTH",
        "PREAUTH",
        "PREAUTH_CAPTURE",
        "ADJUST",
        "VOID",
        "VOID_RETURN",
        "RETURN",
        "REFUND",
        "NAKEDREFUND",
        "GETBALANCE",
        "BATCHCLOSE",
        "ACTIVATE",
        "BALANCE_LOCK",
        "LOAD",
        "CASHOUT",
        "REDEEM",
        "UNLOCK",
    ],
);

/// Card transaction settlement state.
pub static CARD_TRANSACTION_STATE: TypeDescriptor =
    TypeDescriptor::enumeration("CardTransactionState", &["PENDING", "CLOSED"]);

/// Device transaction state.
pub static TX_STATE: TypeDescriptor =
    TypeDescriptor::enumeration("TxState", &["START", "SUCCESS", "FAIL"]);

/// Result of a transaction start.
pub static TX_START_RESPONSE_RESULT: TypeDescriptor = TypeDescriptor::enumeration(
    "TxStartResponseResult",
    &[
        "SUCCESS",
        "ALREADY_PROCESSING",
        "DUPLICATE",
        "ORDER_MODIFIED",
        "ORDER_LOAD",
        "FAIL",
    ],
);

/// Kind of transaction a pay intent starts.
pub static TRANSACTION_TYPE: TypeDescriptor = TypeDescriptor::enumeration(
    "TransactionType",
    &["PAYMENT", "CREDIT", "AUTH", "DATA", "BALANCE_INQUIRY"],
);

/// Screen shown on the device.
pub static UI_STATE: TypeDescriptor = TypeDescriptor::enumeration(
    "UiState",
    &[
        "START",
        "FAILED",
        "FATAL",
        "TRY_AGAIN",
        "INPUT_ERROR",
        "PIN_BYPASS_CONFIRM",
        "CANCELED",
        "TIMED_OUT",
        "DECLINED",
        "VOIDED",
        "CONFIGURING",
        "PROCESSING",
        "REMOVE_CARD",
        "PROCESSING_GO_ONLINE",
        "PROCESSING_CREDIT",
        "PROCESSING_SWIPE",
        "SELECT_APPLICATION",
        "PIN_PAD",
        "MANUAL_CARD_NUMBER",
        "MANUAL_CARD_CVV",
        "MANUAL_CARD_CVV_UNREADABLE",
        "MANUAL_CARD_EXPIRATION",
        "SELECT_ACCOUNT",
        "CASHBACK_CONFIRM",
        "CASHBACK_SELECT",
        "CONTACTLESS_TAP_REQUIRED",
        "VOICE_REFERRAL_RESULT",
        "CONFIRM_PARTIAL_AUTH",
        "PACKET_EXCEPTION",
        "CONFIRM_DUPLICATE_CHECK",
        "VERIFY_SIGNATURE_ON_PAPER",
        "VERIFY_SIGNATURE_ON_PAPER_CONFIRM_VOID",
        "VERIFY_SIGNATURE_ON_SCREEN",
        "VERIFY_SIGNATURE_ON_SCREEN_CONFIRM_VOID",
        "ADD_SIGNATURE",
        "SIGNATURE_ON_SCREEN_FALLBACK",
        "RETURN_TO_MERCHANT",
        "SIGNATURE_REJECT",
        "ADD_SIGNATURE_CANCEL_CONFIRM",
        "ADD_TIP",
        "RECEIPT_OPTIONS",
        "HANDLE_TENDER",
        "SELECT_LANGUAGE",
        "APPROVED",
        "OFFLINE_PAYMENT_CONFIRM",
        "STARTING_CUSTOM_ACTIVITY",
        "CUSTOM_ACTIVITY",
        "PRINTING",
    ],
);

/// Whether a screen is being entered or left.
pub static UI_DIRECTION: TypeDescriptor =
    TypeDescriptor::enumeration("UiDirection", &["ENTER", "EXIT"]);

/// Buttons the POS can press on the device.
pub static KEY_PRESS: TypeDescriptor = TypeDescriptor::enumeration(
    "KeyPress",
    &[
        "NONE",
        "ENTER",
        "ESC",
        "BACKSPACE",
        "TAB",
        "STAR",
        "BUTTON_1",
        "BUTTON_2",
        "BUTTON_3",
        "BUTTON_4",
        "BUTTON_5",
        "BUTTON_6",
        "OK",
        "CANCEL",
        "DONE",
        "REJECT",
        "ACCEPT",
    ],
);

/// Coarse device state.
pub static EXTERNAL_DEVICE_STATE: TypeDescriptor = TypeDescriptor::enumeration(
    "ExternalDeviceState",
    &[
        "UNKNOWN",
        "IDLE",
        "BUSY",
        "WAITING_FOR_POS",
        "WAITING_FOR_CUSTOMER",
        "CUSTOMER_ACTIVE",
    ],
);

/// Whether a looked-up payment was found.
pub static QUERY_STATUS: TypeDescriptor =
    TypeDescriptor::enumeration("QueryStatus", &["FOUND", "NOT_FOUND", "IN_PROGRESS"]);

/// Kind of payment challenge.
pub static CHALLENGE_TYPE: TypeDescriptor = TypeDescriptor::enumeration(
    "ChallengeType",
    &[
        "DUPLICATE_CHALLENGE",
        "OFFLINE_CHALLENGE",
        "PARTIAL_AUTH_CHALLENGE",
    ],
);

/// Why a payment was voided.
pub static VOID_REASON: TypeDescriptor = TypeDescriptor::enumeration(
    "VoidReason",
    &[
        "USER_CANCEL",
        "TRANSPORT_ERROR",
        "REJECT_SIGNATURE",
        "REJECT_PARTIAL_AUTH",
        "NOT_APPROVED",
        "FAILED",
        "AUTH_CLOSED_NEW_CARD",
        "DEVELOPER_PAY_PARTIAL_AUTH",
        "REJECT_DUPLICATE",
        "REJECT_OFFLINE",
        "GIFTCARD_LOAD_FAILED",
        "USER_GIFTCARD_LOAD_CANCEL",
        "DEVELOPER_PAY_TIP_ADJUST_FAILED",
        "USER_CUSTOMER_CANCEL",
        "FRAUD",
    ],
);

/// State of a print job.
pub static PRINT_JOB_STATUS: TypeDescriptor = TypeDescriptor::enumeration(
    "PrintJobStatus",
    &["IN_QUEUE", "PRINTING", "DONE", "ERROR", "UNKNOWN", "NOT_FOUND"],
);

/// Printer category.
pub static PRINTER_CATEGORY: TypeDescriptor =
    TypeDescriptor::enumeration("PrinterCategory", &["RECEIPT", "ORDER", "LABEL"]);

/// Pairing outcome.
pub static PAIRING_STATE: TypeDescriptor =
    TypeDescriptor::enumeration("PairingState", &["PAIRED", "INITIAL", "FAILED"]);

// ============================================================================
// Structures
// ============================================================================

/// Reference to another object by id.
pub static REFERENCE: TypeDescriptor =
    TypeDescriptor::structure("Reference", &[Field::string("id")]);

/// Signature point.
pub static POINT: TypeDescriptor =
    TypeDescriptor::structure("Point", &[Field::number("x"), Field::number("y")]);

/// Signature stroke.
pub static STROKE: TypeDescriptor =
    TypeDescriptor::structure("Stroke", &[Field::array("points", &POINT)]);

/// Captured signature.
pub static SIGNATURE: TypeDescriptor = TypeDescriptor::structure(
    "Signature",
    &[
        Field::array("strokes", &STROKE),
        Field::number("width"),
        Field::number("height"),
    ],
);

/// Tender used for a payment.
pub static TENDER: TypeDescriptor = TypeDescriptor::structure(
    "Tender",
    &[
        Field::string("id"),
        Field::string("label"),
        Field::string("labelKey"),
        Field::boolean("enabled"),
    ],
);

/// Card stored for later use.
pub static VAULTED_CARD: TypeDescriptor = TypeDescriptor::structure(
    "VaultedCard",
    &[
        Field::string("first6"),
        Field::string("last4"),
        Field::string("cardholderName"),
        Field::string("expirationDate"),
        Field::string("token"),
    ],
);

/// Card side of a payment.
pub static CARD_TRANSACTION: TypeDescriptor = TypeDescriptor::structure(
    "CardTransaction",
    &[
        Field::typed("cardType", &CARD_TYPE),
        Field::typed("entryType", &CARD_ENTRY_TYPE),
        Field::typed("type", &CARD_TRANSACTION_TYPE),
        Field::typed("state", &CARD_TRANSACTION_STATE),
        Field::string("first6"),
        Field::string("last4"),
        Field::string("authCode"),
        Field::string("referenceId"),
        Field::string("transactionNo"),
        Field::string("cardholderName"),
        Field::string("token"),
        Field::typed("vaultedCard", &VAULTED_CARD),
        Field::object("extra"),
    ],
);

/// Share of a payment applied to a line item.
pub static LINE_ITEM_PAYMENT: TypeDescriptor = TypeDescriptor::structure(
    "LineItemPayment",
    &[
        Field::string("id"),
        Field::string("name"),
        Field::number("percentage"),
        Field::string("binName"),
        Field::boolean("refunded"),
    ],
);

/// Additional charge such as a surcharge.
pub static ADDITIONAL_CHARGE_AMOUNT: TypeDescriptor = TypeDescriptor::structure(
    "AdditionalChargeAmount",
    &[
        Field::string("id"),
        Field::number("amount"),
        Field::number("rate"),
    ],
);

/// Service charge applied to a payment.
pub static SERVICE_CHARGE_AMOUNT: TypeDescriptor = TypeDescriptor::structure(
    "ServiceChargeAmount",
    &[
        Field::string("id"),
        Field::string("name"),
        Field::number("amount"),
    ],
);

/// Refund of a payment.
pub static REFUND: TypeDescriptor = TypeDescriptor::structure(
    "Refund",
    &[
        Field::string("id"),
        Field::typed("orderRef", &REFERENCE),
        Field::typed("device", &REFERENCE),
        Field::typed("payment", &REFERENCE),
        Field::typed("employee", &REFERENCE),
        Field::number("amount"),
        Field::number("taxAmount"),
        Field::number("tipAmount"),
        Field::number("createdTime"),
        Field::array("lineItems", &REFERENCE),
        Field::typed("overrideMerchantTender", &TENDER),
        Field::boolean("voided"),
        Field::typed("voidReason", &VOID_REASON),
    ],
);

/// Payment taken on the device.
pub static PAYMENT: TypeDescriptor = TypeDescriptor::structure(
    "Payment",
    &[
        Field::string("id"),
        Field::typed("order", &REFERENCE),
        Field::typed("device", &REFERENCE),
        Field::typed("employee", &REFERENCE),
        Field::typed("tender", &TENDER),
        Field::number("amount"),
        Field::number("tipAmount"),
        Field::number("taxAmount"),
        Field::number("cashbackAmount"),
        Field::number("cashTendered"),
        Field::string("externalPaymentId"),
        Field::number("createdTime"),
        Field::number("clientCreatedTime"),
        Field::number("modifiedTime"),
        Field::boolean("offline"),
        Field::typed("result", &RESULT),
        Field::typed("cardTransaction", &CARD_TRANSACTION),
        Field::typed("serviceCharge", &SERVICE_CHARGE_AMOUNT),
        Field::array("additionalCharges", &ADDITIONAL_CHARGE_AMOUNT),
        Field::array("lineItemPayments", &LINE_ITEM_PAYMENT),
        Field::array("refunds", &REFUND),
        Field::typed("voidReason", &VOID_REASON),
        Field::object("transactionSettings"),
    ],
);

/// Manual credit.
pub static CREDIT: TypeDescriptor = TypeDescriptor::structure(
    "Credit",
    &[
        Field::string("id"),
        Field::typed("orderRef", &REFERENCE),
        Field::typed("tender", &TENDER),
        Field::typed("employee", &REFERENCE),
        Field::number("amount"),
        Field::number("taxAmount"),
        Field::number("createdTime"),
        Field::typed("cardTransaction", &CARD_TRANSACTION),
    ],
);

/// Order discount.
pub static DISCOUNT: TypeDescriptor = TypeDescriptor::structure(
    "Discount",
    &[
        Field::string("id"),
        Field::string("name"),
        Field::number("amount"),
        Field::number("percentage"),
    ],
);

/// Order line item.
pub static LINE_ITEM: TypeDescriptor = TypeDescriptor::structure(
    "LineItem",
    &[
        Field::string("id"),
        Field::string("name"),
        Field::string("alternateName"),
        Field::number("price"),
        Field::number("unitQty"),
        Field::boolean("isRevenue"),
        Field::string("note"),
        Field::boolean("printed"),
        Field::boolean("exchanged"),
        Field::boolean("refunded"),
        Field::array("discounts", &DISCOUNT),
    ],
);

/// Order.
pub static ORDER: TypeDescriptor = TypeDescriptor::structure(
    "Order",
    &[
        Field::string("id"),
        Field::string("currency"),
        Field::typed("employee", &REFERENCE),
        Field::number("total"),
        Field::string("title"),
        Field::string("note"),
        Field::string("state"),
        Field::boolean("taxRemoved"),
        Field::boolean("isVat"),
        Field::boolean("manualTransaction"),
        Field::boolean("groupLineItems"),
        Field::boolean("testMode"),
        Field::number("createdTime"),
        Field::number("clientCreatedTime"),
        Field::number("modifiedTime"),
        Field::array("lineItems", &LINE_ITEM),
        Field::array("discounts", &DISCOUNT),
        Field::array("payments", &PAYMENT),
        Field::array("refunds", &REFUND),
        Field::array("credits", &CREDIT),
    ],
);

/// Discount as shown on the customer display.
pub static DISPLAY_DISCOUNT: TypeDescriptor = TypeDescriptor::structure(
    "DisplayDiscount",
    &[
        Field::string("id"),
        Field::string("lineItemId"),
        Field::string("name"),
        Field::string("percentage"),
        Field::string("amount"),
    ],
);

/// Line item as shown on the customer display.
pub static DISPLAY_LINE_ITEM: TypeDescriptor = TypeDescriptor::structure(
    "DisplayLineItem",
    &[
        Field::string("id"),
        Field::string("orderId"),
        Field::string("name"),
        Field::string("alternateName"),
        Field::string("price"),
        Field::string("quantity"),
        Field::string("note"),
        Field::array("discounts", &DISPLAY_DISCOUNT),
    ],
);

/// Payment as shown on the customer display.
pub static DISPLAY_PAYMENT: TypeDescriptor = TypeDescriptor::structure(
    "DisplayPayment",
    &[
        Field::string("id"),
        Field::string("label"),
        Field::string("amount"),
        Field::string("tipAmount"),
    ],
);

/// Order as shown on the customer display.
pub static DISPLAY_ORDER: TypeDescriptor = TypeDescriptor::structure(
    "DisplayOrder",
    &[
        Field::string("id"),
        Field::string("title"),
        Field::string("note"),
        Field::string("currency"),
        Field::string("subtotal"),
        Field::string("tax"),
        Field::string("total"),
        Field::string("amountRemaining"),
        Field::array("lineItems", &DISPLAY_LINE_ITEM),
        Field::array("discounts", &DISPLAY_DISCOUNT),
        Field::array("payments", &DISPLAY_PAYMENT),
    ],
);

/// Button offered on the current device screen.
pub static INPUT_OPTION: TypeDescriptor = TypeDescriptor::structure(
    "InputOption",
    &[
        Field::typed("keyPress", &KEY_PRESS),
        Field::string("description"),
    ],
);

/// Question the device asks before accepting a payment.
pub static CHALLENGE: TypeDescriptor = TypeDescriptor::structure(
    "Challenge",
    &[
        Field::string("message"),
        Field::typed("type", &CHALLENGE_TYPE),
        Field::typed("reason", &VOID_REASON),
    ],
);

/// Printer attached to the device.
pub static PRINTER: TypeDescriptor = TypeDescriptor::structure(
    "Printer",
    &[
        Field::string("id"),
        Field::string("name"),
        Field::typed("type", &PRINTER_CATEGORY),
    ],
);

/// Payment not yet delivered to the server.
pub static PENDING_PAYMENT_ENTRY: TypeDescriptor = TypeDescriptor::structure(
    "PendingPaymentEntry",
    &[Field::string("paymentId"), Field::number("amount")],
);

/// Closed-out batch.
pub static BATCH: TypeDescriptor = TypeDescriptor::structure(
    "Batch",
    &[
        Field::string("id"),
        Field::string("state"),
        Field::string("batchType"),
        Field::number("createdTime"),
        Field::number("updatedTime"),
        Field::object("batchTotals"),
    ],
);

/// Card data read without charging.
pub static CARD_DATA: TypeDescriptor = TypeDescriptor::structure(
    "CardData",
    &[
        Field::string("track1"),
        Field::string("track2"),
        Field::string("track3"),
        Field::boolean("encrypted"),
        Field::string("maskedTrack1"),
        Field::string("maskedTrack2"),
        Field::string("first6"),
        Field::string("last4"),
        Field::string("cardholderName"),
        Field::string("exp"),
        Field::string("pan"),
    ],
);

/// What the device should do for a transaction.
pub static PAY_INTENT: TypeDescriptor = TypeDescriptor::structure(
    "PayIntent",
    &[
        Field::string("action"),
        Field::number("amount"),
        Field::number("tippableAmount"),
        Field::number("tipAmount"),
        Field::number("taxAmount"),
        Field::string("orderId"),
        Field::string("paymentId"),
        Field::string("employeeId"),
        Field::typed("transactionType", &TRANSACTION_TYPE),
        Field::boolean("isDisableCashBack"),
        Field::boolean("isTesting"),
        Field::number("cardEntryMethods"),
        Field::boolean("remotePrint"),
        Field::string("transactionNo"),
        Field::boolean("isForceSwipePinEntry"),
        Field::boolean("disableRestartTransactionWhenFailed"),
        Field::string("externalPaymentId"),
        Field::typed("vaultedCard", &VAULTED_CARD),
        Field::boolean("allowOfflinePayment"),
        Field::boolean("approveOfflinePaymentWithoutPrompt"),
        Field::boolean("requiresRemoteConfirmation"),
        Field::boolean("allowPartialAuth"),
        Field::object("applicationTracking"),
        Field::object("transactionSettings"),
    ],
);

/// Customer shown on the display.
pub static CUSTOMER_INFO: TypeDescriptor = TypeDescriptor::structure(
    "CustomerInfo",
    &[
        Field::string("displayString"),
        Field::string("externalId"),
        Field::string("externalSystemName"),
        Field::object("customer"),
        Field::object("extras"),
    ],
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{FieldValue, Instance, transfer};

    #[test]
    fn test_payment_decodes_nested_card_transaction() {
        let source = json!({
            "id": "PAY1",
            "amount": 1000,
            "result": "SUCCESS",
            "cardTransaction": {
                "cardType": "VISA",
                "entryType": "EMV_CONTACT",
                "last4": "1111"
            },
            "lineItemPayments": {"elements": [{"id": "LIP1", "percentage": 100}]}
        });

        let mut payment = Instance::new(&PAYMENT);
        transfer(&source, &mut payment, true).expect("decoded");

        assert_eq!(payment.get_str("id"), Some("PAY1"));
        assert_eq!(
            payment.get("result").and_then(FieldValue::as_constant),
            Some("SUCCESS")
        );
        let card = payment
            .get("cardTransaction")
            .and_then(FieldValue::as_instance)
            .expect("card transaction");
        assert_eq!(
            card.get("cardType").and_then(FieldValue::as_constant),
            Some("VISA")
        );
        assert_eq!(card.get_str("last4"), Some("1111"));
        let shares = payment
            .get("lineItemPayments")
            .and_then(FieldValue::as_array)
            .expect("array");
        assert_eq!(shares.len(), 1);
    }

    #[test]
    fn test_signature_strokes() {
        let source = json!({
            "width": 300,
            "strokes": [{"points": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]}]
        });
        let mut signature = Instance::new(&SIGNATURE);
        transfer(&source, &mut signature, false).expect("decoded");

        let strokes = signature
            .get("strokes")
            .and_then(FieldValue::as_array)
            .expect("strokes");
        let points = strokes[0]
            .get("points")
            .and_then(FieldValue::as_array)
            .expect("points");
        assert_eq!(points[1].get_i64("y"), Some(4));
    }
}
