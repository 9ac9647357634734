//! Scan orchestration: fan out the abuse checks, aggregate their flags,
//! persist the review record, and escalate.

use crate::domain::{
    AbuseFlag, AbuseReviewRecord, BookingActivity, ProviderProfile, ReviewSignal, Severity,
    TimeMs, TriggerType, UserId,
};
use crate::engine::abuse::{
    fake_account_flags, refund_rate_flags, review_streak_flags, same_client_flags, velocity_flags,
    ScanThresholds,
};
use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Error from the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Read/write surface the scanner needs from the document store.
///
/// Implemented by [`crate::db::Repository`]; tests substitute a scripted
/// store to exercise failure isolation and escalation.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Bookings where `provider` is the provider, created at or after `since`.
    async fn booking_activity_since(
        &self,
        provider: &UserId,
        since: TimeMs,
    ) -> Result<Vec<BookingActivity>, StoreError>;

    /// The most recent visible reviews for `provider`, newest first, with
    /// each author's account creation time.
    async fn recent_review_signals(
        &self,
        provider: &UserId,
        limit: u32,
    ) -> Result<Vec<ReviewSignal>, StoreError>;

    /// The provider's profile, if the account exists.
    async fn provider_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<ProviderProfile>, StoreError>;

    /// Append one scan's flag list to the review queue.
    async fn append_abuse_review(&self, record: &AbuseReviewRecord) -> Result<(), StoreError>;

    /// Freeze the account unless it is already frozen. Returns whether this
    /// call applied the freeze.
    async fn freeze_account(
        &self,
        user: &UserId,
        reason: &str,
        at: TimeMs,
    ) -> Result<bool, StoreError>;
}

/// Outcome of one scan run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub success: bool,
    pub flags: Vec<AbuseFlag>,
    pub actions_required: bool,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs the heuristic battery against one provider account.
///
/// Constructed once at startup and shared through `AppState`; holds no
/// per-scan state, so scans for different users run concurrently without
/// coordination.
pub struct Scanner {
    store: Arc<dyn ScanStore>,
    thresholds: ScanThresholds,
}

impl Scanner {
    pub fn new(store: Arc<dyn ScanStore>, thresholds: ScanThresholds) -> Self {
        Scanner { store, thresholds }
    }

    /// Scan `user_id` now. Empty ids are rejected before any query runs.
    pub async fn scan_user(
        &self,
        user_id: &str,
        trigger: TriggerType,
    ) -> Result<ScanReport, ScanError> {
        if user_id.trim().is_empty() {
            return Err(ScanError::InvalidArgument("userId is required".to_string()));
        }
        self.scan_at(&UserId::new(user_id), trigger, TimeMs::now())
            .await
    }

    /// Deterministic entry point: all trailing windows anchor on `now`.
    pub async fn scan_at(
        &self,
        user: &UserId,
        trigger: TriggerType,
        now: TimeMs,
    ) -> Result<ScanReport, ScanError> {
        // The five checks are independent; a failing query downgrades its
        // check to zero flags and must never abort the siblings.
        let (same_client, refunds, velocity, reviews, fake_account) = futures::join!(
            self.same_client_check(user, now),
            self.refund_check(user, now),
            self.velocity_check(user, now),
            self.review_check(user, now),
            self.fake_account_check(user, now),
        );

        let mut flags = Vec::new();
        flags.extend(same_client);
        flags.extend(refunds);
        flags.extend(velocity);
        flags.extend(reviews);
        flags.extend(fake_account);

        let actions_required = !flags.is_empty();
        if actions_required {
            let record = AbuseReviewRecord {
                id: Uuid::new_v4().to_string(),
                user_id: user.clone(),
                trigger,
                flags: flags.clone(),
                created_at: now,
            };
            self.store.append_abuse_review(&record).await?;
            info!(
                user = %user,
                flag_count = flags.len(),
                trigger = trigger.as_str(),
                "abuse review record created"
            );
        }

        if let Some(worst) = flags.iter().find(|f| f.severity == Severity::High) {
            let applied = self
                .store
                .freeze_account(user, &worst.description, now)
                .await?;
            if applied {
                info!(user = %user, reason = %worst.description, "account frozen");
            }
        }

        Ok(ScanReport {
            success: true,
            flags,
            actions_required,
        })
    }

    async fn same_client_check(&self, user: &UserId, now: TimeMs) -> Vec<AbuseFlag> {
        let since = now.minus(Duration::days(30));
        match self.store.booking_activity_since(user, since).await {
            Ok(rows) => same_client_flags(&rows, &self.thresholds),
            Err(e) => skip_check("same-client", user, e),
        }
    }

    async fn refund_check(&self, user: &UserId, now: TimeMs) -> Vec<AbuseFlag> {
        let since = now.minus(Duration::days(90));
        match self.store.booking_activity_since(user, since).await {
            Ok(rows) => refund_rate_flags(&rows, &self.thresholds),
            Err(e) => skip_check("refund-rate", user, e),
        }
    }

    async fn velocity_check(&self, user: &UserId, now: TimeMs) -> Vec<AbuseFlag> {
        let since = now.minus(Duration::hours(24));
        match self.store.booking_activity_since(user, since).await {
            Ok(rows) => velocity_flags(&rows, &self.thresholds),
            Err(e) => skip_check("velocity", user, e),
        }
    }

    async fn review_check(&self, user: &UserId, now: TimeMs) -> Vec<AbuseFlag> {
        match self.store.recent_review_signals(user, 10).await {
            Ok(rows) => review_streak_flags(&rows, &self.thresholds, now),
            Err(e) => skip_check("review-pattern", user, e),
        }
    }

    async fn fake_account_check(&self, user: &UserId, now: TimeMs) -> Vec<AbuseFlag> {
        match self.store.provider_profile(user).await {
            Ok(Some(profile)) => fake_account_flags(&profile, &self.thresholds, now),
            Ok(None) => Vec::new(),
            Err(e) => skip_check("fake-account", user, e),
        }
    }
}

fn skip_check(check: &str, user: &UserId, err: StoreError) -> Vec<AbuseFlag> {
    warn!(check, user = %user, error = %err, "check query failed, contributing no flags");
    Vec::new()
}
