//! Money arithmetic helpers.
//!
//! All dollar amounts flow through rust_decimal to avoid floating-point
//! drift; payment processors operate in integer minor units, so conversion
//! to cents is the authoritative step and uses half-up rounding.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert a decimal dollar amount to integer cents, rounding half-up.
pub fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Convert integer cents back to a decimal dollar amount (2 dp).
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Round a dollar amount to 2 decimal places, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Platform fee on `amount` at `rate` (e.g. 0.05), rounded half-up to cents.
pub fn platform_fee(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate)
}

/// Format an amount in a display currency: `"$1,000.50"`, `"€100.00"`.
///
/// Codes without a known symbol render as `"XXX 100.00"`.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let cents = to_cents(amount);
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = cents / 100;
    let fraction = cents % 100;

    let mut body = group_thousands(whole);
    body.push_str(&format!(".{:02}", fraction));

    let sign = if negative { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, body),
        None => format!("{}{} {}", sign, currency, body),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

fn group_thousands(mut n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let mut groups = Vec::new();
    while n >= 1000 {
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    let mut out = n.to_string();
    for group in groups.iter().rev() {
        out.push(',');
        out.push_str(group);
    }
    out
}
