//! Domain types for the split-booking marketplace core.
//!
//! This module provides:
//! - Lossless money handling helpers over rust_decimal
//! - Domain primitives: TimeMs, UserId, BookingId
//! - Split booking, review, and profile records with status codecs
//! - Abuse flag types produced by the scan heuristics

pub mod booking;
pub mod flag;
pub mod money;
pub mod primitives;
pub mod profile;
pub mod review;

pub use booking::{
    BookingActivity, BookingStatus, ClientSlot, PaymentStatus, SplitBooking, TalentStatus,
};
pub use flag::{AbuseFlag, AbuseReviewRecord, FlagType, Severity, TriggerType};
pub use primitives::{BookingId, TimeMs, UserId};
pub use profile::ProviderProfile;
pub use review::{Review, ReviewSignal};
