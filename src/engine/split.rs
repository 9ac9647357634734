//! Split payment arithmetic and payment-state queries.
//!
//! Everything here is pure and total over well-formed bookings; the write
//! path guarantees a positive total and two distinct client uids.

use crate::domain::money::{from_cents, to_cents};
use crate::domain::{BookingId, BookingStatus, ClientSlot, PaymentStatus, SplitBooking, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

/// The integer-cent split of a booking total, with the dollar view of each
/// leg derived back from the corrected cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitAmounts {
    pub total_cents: i64,
    pub client_a_cents: i64,
    pub client_b_cents: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_a: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_b: Decimal,
}

/// One client's view of a split booking's payment state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPaymentView {
    pub status: PaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub amount_cents: i64,
    pub checkout_session_id: Option<String>,
}

/// Redirect URLs handed to the hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUrls {
    pub success_url: String,
    pub cancel_url: String,
    pub return_url: String,
}

/// Convert the booking's decimal shares to integer cents and correct any
/// rounding discrepancy so the legs sum to the total exactly.
///
/// Independent half-up rounding of the two shares can land one cent off the
/// rounded total; the difference is applied to client A's leg. Downstream
/// processors reconcile in integer minor units, so the exact-sum property
/// must hold for every input.
pub fn calculate_split_payments(booking: &SplitBooking) -> SplitAmounts {
    let total_cents = to_cents(booking.total_cost);
    let mut client_a_cents = to_cents(booking.client_a_share);
    let client_b_cents = to_cents(booking.client_b_share);

    let discrepancy = total_cents - (client_a_cents + client_b_cents);
    if discrepancy != 0 {
        client_a_cents += discrepancy;
    }

    SplitAmounts {
        total_cents,
        client_a_cents,
        client_b_cents,
        total: from_cents(total_cents),
        client_a: from_cents(client_a_cents),
        client_b: from_cents(client_b_cents),
    }
}

/// True iff both clients have paid.
pub fn is_fully_paid(booking: &SplitBooking) -> bool {
    booking.client_a_payment_status == PaymentStatus::Paid
        && booking.client_b_payment_status == PaymentStatus::Paid
}

/// True iff the booking is confirmed, `uid` is one of the two clients, and
/// that client has not paid yet. Unknown uids get `false`, never an error.
pub fn client_needs_payment(booking: &SplitBooking, uid: &UserId) -> bool {
    if booking.status != BookingStatus::Confirmed {
        return false;
    }
    match booking.slot_of(uid) {
        Some(ClientSlot::A) => booking.client_a_payment_status == PaymentStatus::Pending,
        Some(ClientSlot::B) => booking.client_b_payment_status == PaymentStatus::Pending,
        None => false,
    }
}

/// Per-client payment view; `None` for a uid outside the booking.
pub fn client_payment_status(booking: &SplitBooking, uid: &UserId) -> Option<ClientPaymentView> {
    let amounts = calculate_split_payments(booking);
    match booking.slot_of(uid)? {
        ClientSlot::A => Some(ClientPaymentView {
            status: booking.client_a_payment_status,
            amount: amounts.client_a,
            amount_cents: amounts.client_a_cents,
            checkout_session_id: booking.client_a_session_id.clone(),
        }),
        ClientSlot::B => Some(ClientPaymentView {
            status: booking.client_b_payment_status,
            amount: amounts.client_b,
            amount_cents: amounts.client_b_cents,
            checkout_session_id: booking.client_b_session_id.clone(),
        }),
    }
}

/// Build the checkout redirect URLs for a booking off the configured base.
///
/// The `{CHECKOUT_SESSION_ID}` placeholder is substituted by the payment
/// provider when it redirects back.
pub fn payment_urls(booking_id: &BookingId, base_url: &str) -> PaymentUrls {
    let base = base_url.trim_end_matches('/');
    PaymentUrls {
        success_url: format!(
            "{}/bookings/{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}",
            base, booking_id
        ),
        cancel_url: format!("{}/bookings/{}/payment/cancelled", base, booking_id),
        return_url: format!("{}/bookings/{}", base, booking_id),
    }
}
