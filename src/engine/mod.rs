//! Pure computation engines: split-payment arithmetic and abuse heuristics.

pub mod abuse;
pub mod split;

pub use abuse::ScanThresholds;
pub use split::{
    calculate_split_payments, client_needs_payment, client_payment_status, is_fully_paid,
    payment_urls, ClientPaymentView, PaymentUrls, SplitAmounts,
};
