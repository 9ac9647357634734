use backline::domain::money::{format_currency, platform_fee};
use backline::domain::{BookingId, BookingStatus, PaymentStatus, SplitBooking, TimeMs, UserId};
use backline::engine::split::{
    calculate_split_payments, client_needs_payment, client_payment_status, is_fully_paid,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn booking(total: &str, a: &str, b: &str) -> SplitBooking {
    SplitBooking {
        id: BookingId::new("bk_1"),
        provider_id: UserId::new("prov_1"),
        total_cost: d(total),
        client_a_uid: UserId::new("alice"),
        client_b_uid: UserId::new("bob"),
        client_a_share: d(a),
        client_b_share: d(b),
        client_a_payment_status: PaymentStatus::Pending,
        client_b_payment_status: PaymentStatus::Pending,
        status: BookingStatus::Confirmed,
        client_a_session_id: None,
        client_b_session_id: None,
        requested_talent: None,
        talent_status: None,
        created_at: TimeMs::new(0),
    }
}

#[test]
fn test_exact_sum_holds_across_awkward_shares() {
    let cases = [
        ("100.03", "60.01", "40.02"),
        ("100.01", "33.335", "66.675"),
        ("0.01", "0.005", "0.005"),
        ("99.99", "33.33", "66.66"),
        ("1250.55", "625.275", "625.275"),
        ("3", "1.999", "1.001"),
    ];

    for (total, a, b) in cases {
        let amounts = calculate_split_payments(&booking(total, a, b));
        assert_eq!(
            amounts.client_a_cents + amounts.client_b_cents,
            amounts.total_cents,
            "cent legs must sum exactly for total={} a={} b={}",
            total,
            a,
            b
        );
    }
}

#[test]
fn test_spec_example_cents() {
    let amounts = calculate_split_payments(&booking("100.03", "60.01", "40.02"));
    assert_eq!(amounts.total_cents, 10003);
    assert_eq!(amounts.client_a_cents, 6001);
    assert_eq!(amounts.client_b_cents, 4002);
}

#[test]
fn test_fully_paid_only_when_both_paid() {
    let mut b = booking("200", "100", "100");
    let combos = [
        (PaymentStatus::Pending, PaymentStatus::Pending, false),
        (PaymentStatus::Paid, PaymentStatus::Pending, false),
        (PaymentStatus::Pending, PaymentStatus::Paid, false),
        (PaymentStatus::Refunded, PaymentStatus::Refunded, false),
        (PaymentStatus::Paid, PaymentStatus::Refunded, false),
        (PaymentStatus::Paid, PaymentStatus::Paid, true),
    ];
    for (a, b_status, expected) in combos {
        b.client_a_payment_status = a;
        b.client_b_payment_status = b_status;
        assert_eq!(is_fully_paid(&b), expected, "{:?}/{:?}", a, b_status);
    }
}

#[test]
fn test_unknown_party_fails_closed() {
    let b = booking("200", "100", "100");
    let stranger = UserId::new("mallory");
    assert!(!client_needs_payment(&b, &stranger));
    assert_eq!(client_payment_status(&b, &stranger), None);
}

#[test]
fn test_queries_are_idempotent() {
    let b = booking("100.03", "60.01", "40.02");
    let alice = UserId::new("alice");
    assert_eq!(
        client_payment_status(&b, &alice),
        client_payment_status(&b, &alice)
    );
    assert_eq!(
        client_needs_payment(&b, &alice),
        client_needs_payment(&b, &alice)
    );
}

#[test]
fn test_currency_formatting_examples() {
    assert_eq!(format_currency(d("1000.5"), "USD"), "$1,000.50");
    assert_eq!(format_currency(d("100"), "EUR"), "€100.00");
}

#[test]
fn test_platform_fee_example() {
    assert_eq!(platform_fee(d("123.45"), d("0.05")), d("6.17"));
}
