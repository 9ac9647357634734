//! Split booking endpoints: the validating write path, the split view, and
//! checkout orchestration against the payment provider.

use crate::api::AppState;
use crate::domain::money::{format_currency, platform_fee, to_cents};
use crate::domain::{
    BookingId, BookingStatus, ClientSlot, PaymentStatus, SplitBooking, TalentStatus, TimeMs,
    UserId,
};
use crate::engine::split::{
    calculate_split_payments, client_needs_payment, client_payment_status, is_fully_paid,
    payment_urls, ClientPaymentView, PaymentUrls, SplitAmounts,
};
use crate::error::AppError;
use crate::provider::{idempotency_key, CheckoutRequest};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub provider_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub client_a_uid: String,
    pub client_b_uid: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_a_share: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub client_b_share: Decimal,
    pub requested_talent: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: SplitBooking,
    pub amounts: SplitAmounts,
    #[serde(with = "rust_decimal::serde::float")]
    pub platform_fee: Decimal,
    pub total_display: String,
    pub fully_paid: bool,
}

fn booking_response(booking: SplitBooking, fee_pct: Decimal) -> BookingResponse {
    let amounts = calculate_split_payments(&booking);
    BookingResponse {
        platform_fee: platform_fee(booking.total_cost, fee_pct),
        total_display: format_currency(booking.total_cost, "USD"),
        fully_paid: is_fully_paid(&booking),
        amounts,
        booking,
    }
}

/// The one place split bookings are constructed: enforces the contract the
/// ledger assumes (positive total, two distinct clients, shares covering
/// the total).
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    if request.total_cost <= Decimal::ZERO {
        return Err(AppError::BadRequest("totalCost must be positive".into()));
    }
    if request.client_a_uid == request.client_b_uid {
        return Err(AppError::BadRequest(
            "clientAUid and clientBUid must be distinct".into(),
        ));
    }
    let share_cents = to_cents(request.client_a_share) + to_cents(request.client_b_share);
    if (share_cents - to_cents(request.total_cost)).abs() > 1 {
        return Err(AppError::BadRequest(
            "client shares must sum to totalCost".into(),
        ));
    }

    let requested_talent = request.requested_talent.map(UserId::new);
    let talent_status = requested_talent.as_ref().map(|_| TalentStatus::Invited);

    let booking = SplitBooking {
        id: BookingId::new(Uuid::new_v4().to_string()),
        provider_id: UserId::new(request.provider_id),
        total_cost: request.total_cost,
        client_a_uid: UserId::new(request.client_a_uid),
        client_b_uid: UserId::new(request.client_b_uid),
        client_a_share: request.client_a_share,
        client_b_share: request.client_b_share,
        client_a_payment_status: PaymentStatus::Pending,
        client_b_payment_status: PaymentStatus::Pending,
        status: BookingStatus::Pending,
        client_a_session_id: None,
        client_b_session_id: None,
        requested_talent,
        talent_status,
        created_at: TimeMs::now(),
    };

    state.repo.insert_split_booking(&booking).await?;

    Ok((
        StatusCode::CREATED,
        Json(booking_response(booking, state.config.platform_fee_pct)),
    ))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .repo
        .get_split_booking(&BookingId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?;

    Ok(Json(booking_response(
        booking,
        state.config.platform_fee_pct,
    )))
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusQuery {
    pub client: String,
}

/// Per-client payment view. A uid outside the booking yields a JSON `null`
/// body, not an error.
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PaymentStatusQuery>,
) -> Result<Json<Option<ClientPaymentView>>, AppError> {
    let booking = state
        .repo
        .get_split_booking(&BookingId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?;

    Ok(Json(client_payment_status(
        &booking,
        &UserId::new(params.client),
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub client_uid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub redirect_url: String,
    pub urls: PaymentUrls,
}

pub async fn create_checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let booking = state
        .repo
        .get_split_booking(&BookingId::new(id.clone()))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?;

    let client = UserId::new(body.client_uid);
    if !client_needs_payment(&booking, &client) {
        return Err(AppError::Conflict(
            "payment is not open for this client".into(),
        ));
    }

    let amounts = calculate_split_payments(&booking);
    // slot_of is Some here: client_needs_payment already matched the uid.
    let (slot, amount_cents) = match booking.slot_of(&client) {
        Some(ClientSlot::A) => (ClientSlot::A, amounts.client_a_cents),
        Some(ClientSlot::B) => (ClientSlot::B, amounts.client_b_cents),
        None => {
            return Err(AppError::Conflict(
                "payment is not open for this client".into(),
            ))
        }
    };

    let urls = payment_urls(&booking.id, &state.config.base_url);
    let request = CheckoutRequest {
        idempotency_key: idempotency_key(&booking.id, &client),
        booking_id: booking.id.clone(),
        client_uid: client,
        amount_cents,
        currency: "USD".to_string(),
        success_url: urls.success_url.clone(),
        cancel_url: urls.cancel_url.clone(),
    };

    let session = state
        .provider
        .create_checkout_session(&request)
        .await
        .map_err(|e| AppError::Internal(format!("payment provider: {}", e)))?;

    state
        .repo
        .set_checkout_session(&booking.id, slot, &session.session_id)
        .await?;

    Ok(Json(CheckoutResponse {
        session_id: session.session_id,
        redirect_url: session.redirect_url,
        urls,
    }))
}
