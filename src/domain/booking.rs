//! Split booking types and status codecs.

use super::{BookingId, TimeMs, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-client payment lifecycle. The two clients progress independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Overall booking state. Payment collection is only open on `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Invitation state of an optional secondary participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentStatus {
    Invited,
    Accepted,
    Declined,
}

impl TalentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TalentStatus::Invited => "invited",
            TalentStatus::Accepted => "accepted",
            TalentStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "invited" => Some(TalentStatus::Invited),
            "accepted" => Some(TalentStatus::Accepted),
            "declined" => Some(TalentStatus::Declined),
            _ => None,
        }
    }
}

/// Which of the two paying clients a uid resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSlot {
    A,
    B,
}

/// A studio session booked jointly by two clients, each paying a share.
///
/// Invariants are enforced at the write path: `total_cost > 0`, the two
/// client uids are distinct, and the shares sum to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitBooking {
    pub id: BookingId,
    pub provider_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub client_a_uid: UserId,
    pub client_b_uid: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_a_share: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_b_share: Decimal,
    pub client_a_payment_status: PaymentStatus,
    pub client_b_payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub client_a_session_id: Option<String>,
    pub client_b_session_id: Option<String>,
    pub requested_talent: Option<UserId>,
    pub talent_status: Option<TalentStatus>,
    pub created_at: TimeMs,
}

impl SplitBooking {
    /// Resolve a uid to its client slot, if it is part of this booking.
    pub fn slot_of(&self, uid: &UserId) -> Option<ClientSlot> {
        if uid == &self.client_a_uid {
            Some(ClientSlot::A)
        } else if uid == &self.client_b_uid {
            Some(ClientSlot::B)
        } else {
            None
        }
    }
}

/// A booking row reduced to what the abuse heuristics need. Each split
/// booking contributes one row carrying both paying clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingActivity {
    pub booking_id: BookingId,
    pub participants: Vec<UserId>,
    pub status: BookingStatus,
    /// True when either client's payment was refunded.
    pub refunded: bool,
    pub created_at: TimeMs,
}
