//! Review rows and the review signals consumed by the scanner.

use super::Repository;
use crate::domain::{Review, ReviewSignal, TimeMs, UserId};
use sqlx::Row;

impl Repository {
    /// Insert a review.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_review(&self, review: &Review) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO reviews (id, provider_id, author_id, rating, visible, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(review.provider_id.as_str())
        .bind(review.author_id.as_str())
        .bind(review.rating as i64)
        .bind(review.visible as i64)
        .bind(review.created_at.as_i64())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// The most recent visible reviews for a provider, newest first, each
    /// joined with its author's account creation time.
    ///
    /// Authors missing from `users` read as epoch-old accounts, which keeps
    /// them out of the new-account tally.
    pub async fn recent_review_signals(
        &self,
        provider: &UserId,
        limit: u32,
    ) -> Result<Vec<ReviewSignal>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT r.rating, r.created_at_ms, COALESCE(u.created_at_ms, 0) AS author_created_at_ms
            FROM reviews r
            LEFT JOIN users u ON u.id = r.author_id
            WHERE r.provider_id = ? AND r.visible = 1
            ORDER BY r.created_at_ms DESC, r.id DESC
            LIMIT ?
            "#,
        )
        .bind(provider.as_str())
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|r| ReviewSignal {
                rating: r.get::<i64, _>("rating") as u8,
                created_at: TimeMs::new(r.get("created_at_ms")),
                author_created_at: TimeMs::new(r.get("author_created_at_ms")),
            })
            .collect())
    }
}
