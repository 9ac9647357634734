pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod provider;
pub mod scanner;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    AbuseFlag, BookingId, BookingStatus, FlagType, PaymentStatus, Severity, SplitBooking, TimeMs,
    TriggerType, UserId,
};
pub use engine::ScanThresholds;
pub use error::AppError;
pub use provider::{HttpPaymentProvider, MockPaymentProvider, PaymentProvider};
pub use scanner::{ScanReport, ScanStore, Scanner};
