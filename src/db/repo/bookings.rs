//! Split booking reads/writes and the activity query behind the scanner.

use super::{parse_decimal_or_zero, Repository};
use crate::domain::{
    BookingActivity, BookingId, BookingStatus, ClientSlot, PaymentStatus, SplitBooking,
    TalentStatus, TimeMs, UserId,
};
use sqlx::Row;
use tracing::warn;

impl Repository {
    /// Insert a split booking.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including duplicate ids).
    pub async fn insert_split_booking(&self, booking: &SplitBooking) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO split_bookings
                (id, provider_id, total_cost, client_a_uid, client_b_uid,
                 client_a_share, client_b_share,
                 client_a_payment_status, client_b_payment_status, status,
                 client_a_session_id, client_b_session_id,
                 requested_talent, talent_status, created_at_ms)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id.as_str())
        .bind(booking.provider_id.as_str())
        .bind(booking.total_cost.to_string())
        .bind(booking.client_a_uid.as_str())
        .bind(booking.client_b_uid.as_str())
        .bind(booking.client_a_share.to_string())
        .bind(booking.client_b_share.to_string())
        .bind(booking.client_a_payment_status.as_str())
        .bind(booking.client_b_payment_status.as_str())
        .bind(booking.status.as_str())
        .bind(booking.client_a_session_id.as_deref())
        .bind(booking.client_b_session_id.as_deref())
        .bind(booking.requested_talent.as_ref().map(|t| t.as_str().to_string()))
        .bind(booking.talent_status.map(|s| s.as_str()))
        .bind(booking.created_at.as_i64())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Fetch a split booking by id.
    pub async fn get_split_booking(
        &self,
        id: &BookingId,
    ) -> Result<Option<SplitBooking>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, provider_id, total_cost, client_a_uid, client_b_uid,
                   client_a_share, client_b_share,
                   client_a_payment_status, client_b_payment_status, status,
                   client_a_session_id, client_b_session_id,
                   requested_talent, talent_status, created_at_ms
            FROM split_bookings
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| {
            let id: String = r.get("id");
            let total_cost = parse_decimal_or_zero(&r.get::<String, _>("total_cost"), "total_cost", &id);
            let client_a_share =
                parse_decimal_or_zero(&r.get::<String, _>("client_a_share"), "client_a_share", &id);
            let client_b_share =
                parse_decimal_or_zero(&r.get::<String, _>("client_b_share"), "client_b_share", &id);

            SplitBooking {
                provider_id: UserId::new(r.get::<String, _>("provider_id")),
                total_cost,
                client_a_uid: UserId::new(r.get::<String, _>("client_a_uid")),
                client_b_uid: UserId::new(r.get::<String, _>("client_b_uid")),
                client_a_share,
                client_b_share,
                client_a_payment_status: parse_payment_status(
                    &r.get::<String, _>("client_a_payment_status"),
                    &id,
                ),
                client_b_payment_status: parse_payment_status(
                    &r.get::<String, _>("client_b_payment_status"),
                    &id,
                ),
                status: parse_booking_status(&r.get::<String, _>("status"), &id),
                client_a_session_id: r.get("client_a_session_id"),
                client_b_session_id: r.get("client_b_session_id"),
                requested_talent: r
                    .get::<Option<String>, _>("requested_talent")
                    .map(UserId::new),
                talent_status: r
                    .get::<Option<String>, _>("talent_status")
                    .as_deref()
                    .and_then(TalentStatus::parse),
                created_at: TimeMs::new(r.get("created_at_ms")),
                id: BookingId::new(id),
            }
        }))
    }

    /// Store the checkout session id for one client's leg.
    pub async fn set_checkout_session(
        &self,
        id: &BookingId,
        slot: ClientSlot,
        session_id: &str,
    ) -> Result<(), sqlx::Error> {
        let sql = match slot {
            ClientSlot::A => "UPDATE split_bookings SET client_a_session_id = ? WHERE id = ?",
            ClientSlot::B => "UPDATE split_bookings SET client_b_session_id = ? WHERE id = ?",
        };
        sqlx::query(sql)
            .bind(session_id)
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Move one client's payment status. Stands in for the provider webhook.
    pub async fn set_payment_status(
        &self,
        id: &BookingId,
        slot: ClientSlot,
        status: PaymentStatus,
    ) -> Result<(), sqlx::Error> {
        let sql = match slot {
            ClientSlot::A => "UPDATE split_bookings SET client_a_payment_status = ? WHERE id = ?",
            ClientSlot::B => "UPDATE split_bookings SET client_b_payment_status = ? WHERE id = ?",
        };
        sqlx::query(sql)
            .bind(status.as_str())
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Move the overall booking status.
    pub async fn set_booking_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE split_bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Booking activity for a provider created at or after `since`, oldest
    /// first. Feeds the scan heuristics.
    pub async fn booking_activity_since(
        &self,
        provider: &UserId,
        since: TimeMs,
    ) -> Result<Vec<BookingActivity>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_a_uid, client_b_uid, status,
                   client_a_payment_status, client_b_payment_status, created_at_ms
            FROM split_bookings
            WHERE provider_id = ? AND created_at_ms >= ?
            ORDER BY created_at_ms ASC, id ASC
            "#,
        )
        .bind(provider.as_str())
        .bind(since.as_i64())
        .fetch_all(self.pool())
        .await?;

        let activity = rows
            .iter()
            .map(|r| {
                let id: String = r.get("id");
                let refunded = [
                    r.get::<String, _>("client_a_payment_status"),
                    r.get::<String, _>("client_b_payment_status"),
                ]
                .iter()
                .any(|s| parse_payment_status(s, &id) == PaymentStatus::Refunded);

                BookingActivity {
                    participants: vec![
                        UserId::new(r.get::<String, _>("client_a_uid")),
                        UserId::new(r.get::<String, _>("client_b_uid")),
                    ],
                    status: parse_booking_status(&r.get::<String, _>("status"), &id),
                    refunded,
                    created_at: TimeMs::new(r.get("created_at_ms")),
                    booking_id: BookingId::new(id),
                }
            })
            .collect();

        Ok(activity)
    }
}

// Unknown stored statuses degrade to `pending`, which keeps payment checks
// closed and bookings out of the completed/confirmed heuristics.
fn parse_payment_status(value: &str, key: &str) -> PaymentStatus {
    PaymentStatus::parse(value).unwrap_or_else(|| {
        warn!(key = %key, value = %value, "Unknown payment status, using pending");
        PaymentStatus::Pending
    })
}

fn parse_booking_status(value: &str, key: &str) -> BookingStatus {
    BookingStatus::parse(value).unwrap_or_else(|| {
        warn!(key = %key, value = %value, "Unknown booking status, using pending");
        BookingStatus::Pending
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn booking(id: &str, provider: &str, at: i64) -> SplitBooking {
        SplitBooking {
            id: BookingId::new(id),
            provider_id: UserId::new(provider),
            total_cost: d("100.03"),
            client_a_uid: UserId::new("alice"),
            client_b_uid: UserId::new("bob"),
            client_a_share: d("60.01"),
            client_b_share: d("40.02"),
            client_a_payment_status: PaymentStatus::Pending,
            client_b_payment_status: PaymentStatus::Pending,
            status: BookingStatus::Pending,
            client_a_session_id: None,
            client_b_session_id: None,
            requested_talent: None,
            talent_status: None,
            created_at: TimeMs::new(at),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_booking_roundtrip() {
        let (repo, _temp) = setup_test_db().await;

        let mut b = booking("bk_1", "prov_1", 1_000);
        b.requested_talent = Some(UserId::new("engineer_9"));
        b.talent_status = Some(TalentStatus::Invited);
        repo.insert_split_booking(&b).await.expect("insert failed");

        let fetched = repo
            .get_split_booking(&BookingId::new("bk_1"))
            .await
            .expect("query failed")
            .expect("booking missing");
        assert_eq!(fetched, b);
    }

    #[tokio::test]
    async fn test_get_booking_missing() {
        let (repo, _temp) = setup_test_db().await;
        let fetched = repo
            .get_split_booking(&BookingId::new("nope"))
            .await
            .unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_status_and_session_updates() {
        let (repo, _temp) = setup_test_db().await;
        let id = BookingId::new("bk_1");
        repo.insert_split_booking(&booking("bk_1", "prov_1", 1_000))
            .await
            .unwrap();

        repo.set_booking_status(&id, BookingStatus::Confirmed)
            .await
            .unwrap();
        repo.set_checkout_session(&id, ClientSlot::B, "cs_test_7")
            .await
            .unwrap();
        repo.set_payment_status(&id, ClientSlot::B, PaymentStatus::Paid)
            .await
            .unwrap();

        let fetched = repo.get_split_booking(&id).await.unwrap().unwrap();
        assert_eq!(fetched.status, BookingStatus::Confirmed);
        assert_eq!(fetched.client_b_session_id.as_deref(), Some("cs_test_7"));
        assert_eq!(fetched.client_b_payment_status, PaymentStatus::Paid);
        assert_eq!(fetched.client_a_payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_booking_activity_window_and_refund_mapping() {
        let (repo, _temp) = setup_test_db().await;
        let provider = UserId::new("prov_1");

        let mut early = booking("bk_early", "prov_1", 1_000);
        early.status = BookingStatus::Completed;
        let mut refunded = booking("bk_refunded", "prov_1", 5_000);
        refunded.client_a_payment_status = PaymentStatus::Refunded;
        let other_provider = booking("bk_other", "prov_2", 6_000);

        repo.insert_split_booking(&early).await.unwrap();
        repo.insert_split_booking(&refunded).await.unwrap();
        repo.insert_split_booking(&other_provider).await.unwrap();

        let activity = repo
            .booking_activity_since(&provider, TimeMs::new(2_000))
            .await
            .unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].booking_id, BookingId::new("bk_refunded"));
        assert!(activity[0].refunded);
        assert_eq!(
            activity[0].participants,
            vec![UserId::new("alice"), UserId::new("bob")]
        );

        let all = repo
            .booking_activity_since(&provider, TimeMs::new(0))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].status, BookingStatus::Completed);
    }
}
