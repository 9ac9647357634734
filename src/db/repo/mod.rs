//! Repository layer for database operations.
//!
//! Methods are organized across submodules by domain:
//! - `bookings.rs` - split booking reads/writes and scan activity queries
//! - `reviews.rs` - review rows and review signals for the scanner
//!
//! This module holds account operations (profiles, the conditional freeze)
//! and the append-only abuse review queue.

mod bookings;
mod reviews;

use crate::domain::{
    AbuseFlag, AbuseReviewRecord, BookingActivity, ProviderProfile, ReviewSignal, TimeMs,
    TriggerType, UserId,
};
use crate::scanner::{ScanStore, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Account operations
    // =========================================================================

    /// Insert or update an account profile.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn upsert_user(&self, profile: &ProviderProfile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, display_name, bio, media_count, completed_bookings, created_at_ms,
                 frozen, frozen_reason, frozen_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                bio = excluded.bio,
                media_count = excluded.media_count,
                completed_bookings = excluded.completed_bookings,
                created_at_ms = excluded.created_at_ms
            "#,
        )
        .bind(profile.user_id.as_str())
        .bind(&profile.display_name)
        .bind(profile.bio.as_deref())
        .bind(profile.media_count as i64)
        .bind(profile.completed_bookings as i64)
        .bind(profile.created_at.as_i64())
        .bind(profile.frozen as i64)
        .bind(profile.frozen_reason.as_deref())
        .bind(profile.frozen_at.map(|t| t.as_i64()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch an account profile by id.
    pub async fn get_provider_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<ProviderProfile>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, display_name, bio, media_count, completed_bookings, created_at_ms,
                   frozen, frozen_reason, frozen_at_ms
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ProviderProfile {
            user_id: UserId::new(r.get::<String, _>("id")),
            display_name: r.get("display_name"),
            bio: r.get("bio"),
            media_count: r.get::<i64, _>("media_count") as u32,
            completed_bookings: r.get::<i64, _>("completed_bookings") as u32,
            created_at: TimeMs::new(r.get("created_at_ms")),
            frozen: r.get::<i64, _>("frozen") != 0,
            frozen_reason: r.get("frozen_reason"),
            frozen_at: r.get::<Option<i64>, _>("frozen_at_ms").map(TimeMs::new),
        }))
    }

    /// Freeze an account unless it is already frozen.
    ///
    /// The conditional update keeps concurrent scans of the same user from
    /// double-applying the freeze. Returns true when this call froze the
    /// account, false when it was frozen already.
    pub async fn freeze_user(
        &self,
        user: &UserId,
        reason: &str,
        at: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET frozen = 1, frozen_reason = ?, frozen_at_ms = ?
            WHERE id = ? AND frozen = 0
            "#,
        )
        .bind(reason)
        .bind(at.as_i64())
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Abuse review queue
    // =========================================================================

    /// Append a scan's flag list to the review queue.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_abuse_review(
        &self,
        record: &AbuseReviewRecord,
    ) -> Result<(), sqlx::Error> {
        let flags_json = serde_json::to_string(&record.flags)
            .map_err(|e| sqlx::Error::Protocol(format!("failed to encode flags: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO abuse_reviews (id, user_id, trigger_type, flags, created_at_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.user_id.as_str())
        .bind(record.trigger.as_str())
        .bind(flags_json)
        .bind(record.created_at.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Review-queue entries for a user, oldest first.
    pub async fn abuse_reviews_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<AbuseReviewRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, trigger_type, flags, created_at_ms
            FROM abuse_reviews
            WHERE user_id = ?
            ORDER BY created_at_ms ASC, id ASC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let flags_json: String = row.get("flags");
                let flags: Vec<AbuseFlag> =
                    serde_json::from_str(&flags_json).unwrap_or_else(|e| {
                        warn!(record = %id, error = %e, "Failed to parse stored flags, using empty list");
                        Vec::new()
                    });
                let trigger_str: String = row.get("trigger_type");
                let trigger = TriggerType::parse(&trigger_str).unwrap_or_else(|| {
                    warn!(record = %id, trigger = %trigger_str, "Unknown trigger type, using manual");
                    TriggerType::Manual
                });

                AbuseReviewRecord {
                    id,
                    user_id: UserId::new(row.get::<String, _>("user_id")),
                    trigger,
                    flags,
                    created_at: TimeMs::new(row.get("created_at_ms")),
                }
            })
            .collect();

        Ok(records)
    }
}

#[async_trait]
impl ScanStore for Repository {
    async fn booking_activity_since(
        &self,
        provider: &UserId,
        since: TimeMs,
    ) -> Result<Vec<BookingActivity>, StoreError> {
        Ok(Repository::booking_activity_since(self, provider, since).await?)
    }

    async fn recent_review_signals(
        &self,
        provider: &UserId,
        limit: u32,
    ) -> Result<Vec<ReviewSignal>, StoreError> {
        Ok(Repository::recent_review_signals(self, provider, limit).await?)
    }

    async fn provider_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<ProviderProfile>, StoreError> {
        Ok(self.get_provider_profile(user).await?)
    }

    async fn append_abuse_review(&self, record: &AbuseReviewRecord) -> Result<(), StoreError> {
        Ok(self.insert_abuse_review(record).await?)
    }

    async fn freeze_account(
        &self,
        user: &UserId,
        reason: &str,
        at: TimeMs,
    ) -> Result<bool, StoreError> {
        Ok(self.freeze_user(user, reason, at).await?)
    }
}

/// Parse a stored canonical decimal, logging and zeroing on corruption.
pub(crate) fn parse_decimal_or_zero(value: &str, column: &str, key: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        warn!(
            key = %key,
            column = %column,
            value = %value,
            error = %e,
            "Failed to parse stored decimal, using zero"
        );
        Decimal::ZERO
    })
}
