//! Abuse heuristics over a provider's booking and review history.
//!
//! Each check is a pure function over rows the scanner already fetched,
//! parameterized by [`ScanThresholds`] and, where account age matters, an
//! explicit `now`. Checks never perform I/O and never look at the clock.

use crate::domain::{
    AbuseFlag, BookingActivity, BookingStatus, FlagType, ProviderProfile, ReviewSignal, Severity,
    TimeMs, UserId,
};
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;

/// Tuning knobs for the scan heuristics. Defaults mirror platform policy.
#[derive(Debug, Clone)]
pub struct ScanThresholds {
    /// Completed/confirmed bookings one client may place with a provider
    /// inside 30 days before flagging.
    pub max_same_client_bookings: u32,
    /// Refund-or-cancel rate above which the 90-day history is flagged.
    pub max_refund_rate: Decimal,
    /// Minimum 90-day sample before the refund rate is meaningful.
    pub min_refund_sample: u32,
    /// Bookings allowed inside 24 hours before the daily-cap flag.
    pub max_bookings_per_day: u32,
    /// Minimum spacing between consecutive bookings.
    pub min_between_bookings: Duration,
    /// Consecutive 5-star reviews that count as a streak.
    pub review_streak: u32,
    /// Accounts younger than this count as "new" in the review check.
    pub new_account_age: Duration,
    /// Accounts younger than this trip the fake-account age sub-flag.
    pub young_account_age: Duration,
    /// Completed bookings above which a thin or young profile is suspect.
    pub min_completed_for_pattern: u32,
}

impl Default for ScanThresholds {
    fn default() -> Self {
        ScanThresholds {
            max_same_client_bookings: 5,
            max_refund_rate: Decimal::new(3, 1),
            min_refund_sample: 10,
            max_bookings_per_day: 10,
            min_between_bookings: Duration::hours(2),
            review_streak: 5,
            new_account_age: Duration::days(7),
            young_account_age: Duration::days(30),
            min_completed_for_pattern: 10,
        }
    }
}

/// Same-client concentration over the trailing 30 days.
///
/// Counts completed/confirmed bookings per client; each client over the
/// threshold yields one flag. Severity escalates to high past double the
/// threshold.
pub fn same_client_flags(bookings: &[BookingActivity], t: &ScanThresholds) -> Vec<AbuseFlag> {
    // BTreeMap keeps flag order deterministic across runs.
    let mut per_client: BTreeMap<&UserId, u32> = BTreeMap::new();
    for b in bookings {
        if matches!(
            b.status,
            BookingStatus::Completed | BookingStatus::Confirmed
        ) {
            for client in &b.participants {
                *per_client.entry(client).or_default() += 1;
            }
        }
    }

    per_client
        .into_iter()
        .filter(|(_, count)| *count > t.max_same_client_bookings)
        .map(|(client, count)| {
            let severity = if count > 2 * t.max_same_client_bookings {
                Severity::High
            } else {
                Severity::Medium
            };
            AbuseFlag::new(
                FlagType::SameClientAbuse,
                severity,
                format!(
                    "{} bookings from client {} in the last 30 days (limit {})",
                    count, client, t.max_same_client_bookings
                ),
                json!({
                    "clientUid": client.as_str(),
                    "bookingCount": count,
                    "threshold": t.max_same_client_bookings,
                    "windowDays": 30,
                }),
            )
        })
        .collect()
}

/// Refund farming over the trailing 90 days.
///
/// Only meaningful once the sample reaches `min_refund_sample` bookings.
pub fn refund_rate_flags(bookings: &[BookingActivity], t: &ScanThresholds) -> Vec<AbuseFlag> {
    let total = bookings.len() as u32;
    if total < t.min_refund_sample {
        return Vec::new();
    }

    let refunded = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Cancelled || b.refunded)
        .count() as u32;

    let rate = Decimal::from(refunded) / Decimal::from(total);
    if rate <= t.max_refund_rate {
        return Vec::new();
    }

    let severity = if rate > Decimal::new(5, 1) {
        Severity::High
    } else {
        Severity::Medium
    };
    vec![AbuseFlag::new(
        FlagType::RefundFarming,
        severity,
        format!(
            "{} of {} bookings refunded or cancelled in the last 90 days ({}% rate)",
            refunded,
            total,
            (rate * Decimal::ONE_HUNDRED).round_dp(1)
        ),
        json!({
            "refundedCount": refunded,
            "totalBookings": total,
            "refundRate": rate,
            "windowDays": 90,
        }),
    )]
}

/// Booking velocity over the trailing 24 hours.
///
/// Two independent signals: the daily cap, and the spacing between
/// consecutive bookings. The spacing walk short-circuits on the first
/// violating pair, so at most one spacing flag is emitted per run.
pub fn velocity_flags(bookings: &[BookingActivity], t: &ScanThresholds) -> Vec<AbuseFlag> {
    let mut flags = Vec::new();

    let count = bookings.len() as u32;
    if count > t.max_bookings_per_day {
        flags.push(AbuseFlag::new(
            FlagType::VelocityAbuse,
            Severity::Medium,
            format!(
                "{} bookings in the last 24 hours (limit {})",
                count, t.max_bookings_per_day
            ),
            json!({
                "bookingCount": count,
                "threshold": t.max_bookings_per_day,
                "windowHours": 24,
            }),
        ));
    }

    let mut by_recency: Vec<&BookingActivity> = bookings.iter().collect();
    by_recency.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    for pair in by_recency.windows(2) {
        let gap = pair[0].created_at.since(pair[1].created_at);
        if gap < t.min_between_bookings {
            flags.push(AbuseFlag::new(
                FlagType::VelocityAbuse,
                Severity::Low,
                format!(
                    "bookings {} and {} created {} minutes apart (minimum {} minutes)",
                    pair[1].booking_id,
                    pair[0].booking_id,
                    gap.num_minutes(),
                    t.min_between_bookings.num_minutes()
                ),
                json!({
                    "gapMinutes": gap.num_minutes(),
                    "minMinutes": t.min_between_bookings.num_minutes(),
                    "bookingIds": [pair[1].booking_id.as_str(), pair[0].booking_id.as_str()],
                }),
            ));
            break;
        }
    }

    flags
}

/// Suspicious review pattern: an unbroken recent run of 5-star reviews,
/// mostly from freshly created accounts.
///
/// Walks the 10 most recent visible reviews newest-first and stops at the
/// first non-5-star rating; only the unbroken streak matters.
pub fn review_streak_flags(
    reviews: &[ReviewSignal],
    t: &ScanThresholds,
    now: TimeMs,
) -> Vec<AbuseFlag> {
    let mut by_recency: Vec<&ReviewSignal> = reviews.iter().collect();
    by_recency.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    by_recency.truncate(10);

    let mut streak: u32 = 0;
    let mut new_client_perfect: u32 = 0;
    for review in by_recency {
        if review.rating != 5 {
            break;
        }
        streak += 1;
        if now.since(review.author_created_at) < t.new_account_age {
            new_client_perfect += 1;
        }
    }

    let required_new = streak * 7 / 10;
    if streak >= t.review_streak && new_client_perfect >= required_new {
        return vec![AbuseFlag::new(
            FlagType::SuspiciousReviews,
            Severity::Medium,
            format!(
                "{} consecutive 5-star reviews, {} from accounts under 7 days old",
                streak, new_client_perfect
            ),
            json!({
                "streakLength": streak,
                "newAccountReviews": new_client_perfect,
                "requiredNewAccountReviews": required_new,
            }),
        )];
    }

    Vec::new()
}

/// Fake-account signals on the provider profile itself. The two sub-flags
/// are independent and may both fire in one run.
pub fn fake_account_flags(
    profile: &ProviderProfile,
    t: &ScanThresholds,
    now: TimeMs,
) -> Vec<AbuseFlag> {
    let mut flags = Vec::new();

    if profile.is_minimal() && profile.completed_bookings > t.min_completed_for_pattern {
        flags.push(AbuseFlag::new(
            FlagType::FakeAccountPattern,
            Severity::Low,
            format!(
                "empty profile with {} completed bookings",
                profile.completed_bookings
            ),
            json!({
                "completedBookings": profile.completed_bookings,
                "hasBio": false,
                "mediaCount": 0,
            }),
        ));
    }

    let age = now.since(profile.created_at);
    if age < t.young_account_age && profile.completed_bookings > t.min_completed_for_pattern {
        flags.push(AbuseFlag::new(
            FlagType::FakeAccountPattern,
            Severity::Low,
            format!(
                "account {} days old with {} completed bookings",
                age.num_days(),
                profile.completed_bookings
            ),
            json!({
                "accountAgeDays": age.num_days(),
                "completedBookings": profile.completed_bookings,
            }),
        ));
    }

    flags
}
