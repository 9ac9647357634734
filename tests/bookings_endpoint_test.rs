use axum::body::Body;
use axum::http::{Request, StatusCode};
use backline::api;
use backline::config::Config;
use backline::domain::{BookingId, BookingStatus, ClientSlot, PaymentStatus, UserId};
use backline::provider::MockPaymentProvider;
use backline::scanner::{ScanStore, Scanner};
use backline::{init_db, Repository, ScanThresholds};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    provider: Arc<MockPaymentProvider>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        port: 0,
        database_path: db_path,
        base_url: "https://backline.test".to_string(),
        payment_provider_url: "http://example.invalid".to_string(),
        platform_fee_pct: Decimal::from_str("0.05").unwrap(),
    };

    let store: Arc<dyn ScanStore> = repo.clone();
    let scanner = Arc::new(Scanner::new(store, ScanThresholds::default()));
    let provider = Arc::new(MockPaymentProvider::new());
    let state = api::AppState::new(repo.clone(), config, scanner, provider.clone());
    let app = api::create_router(state);

    TestApp {
        app,
        repo,
        provider,
        _temp: temp_dir,
    }
}

async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn create_request() -> serde_json::Value {
    serde_json::json!({
        "providerId": "prov_1",
        "totalCost": 100.03,
        "clientAUid": "alice",
        "clientBUid": "bob",
        "clientAShare": 60.01,
        "clientBShare": 40.02,
    })
}

async fn create_booking(test_app: &TestApp) -> String {
    let (status, body) =
        request_json(&test_app.app, "POST", "/v1/bookings", Some(create_request())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["booking"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_booking_returns_split_view() {
    let test_app = setup_test_app().await;

    let (status, body) =
        request_json(&test_app.app, "POST", "/v1/bookings", Some(create_request())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["amounts"]["totalCents"], 10003);
    assert_eq!(body["amounts"]["clientACents"], 6001);
    assert_eq!(body["amounts"]["clientBCents"], 4002);
    assert_eq!(body["platformFee"], 5.0);
    assert_eq!(body["totalDisplay"], "$100.03");
    assert_eq!(body["fullyPaid"], false);
    assert_eq!(body["booking"]["status"], "pending");
}

#[tokio::test]
async fn test_create_booking_validates_write_contract() {
    let test_app = setup_test_app().await;

    let mut negative = create_request();
    negative["totalCost"] = serde_json::json!(-5.0);
    let (status, _) = request_json(&test_app.app, "POST", "/v1/bookings", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut same_client = create_request();
    same_client["clientBUid"] = serde_json::json!("alice");
    let (status, body) =
        request_json(&test_app.app, "POST", "/v1/bookings", Some(same_client)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("distinct"));

    let mut bad_shares = create_request();
    bad_shares["clientAShare"] = serde_json::json!(10.0);
    let (status, _) = request_json(&test_app.app, "POST", "/v1/bookings", Some(bad_shares)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_booking_not_found() {
    let test_app = setup_test_app().await;
    let (status, _) = request_json(&test_app.app, "GET", "/v1/bookings/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_status_views() {
    let test_app = setup_test_app().await;
    let id = create_booking(&test_app).await;

    let (status, body) = request_json(
        &test_app.app,
        "GET",
        &format!("/v1/bookings/{}/payment-status?client=bob", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["amountCents"], 4002);

    // A uid outside the booking reads as null, not an error.
    let (status, body) = request_json(
        &test_app.app,
        "GET",
        &format!("/v1/bookings/{}/payment-status?client=mallory", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_checkout_requires_confirmed_booking() {
    let test_app = setup_test_app().await;
    let id = create_booking(&test_app).await;

    let (status, _) = request_json(
        &test_app.app,
        "POST",
        &format!("/v1/bookings/{}/checkout", id),
        Some(serde_json::json!({"clientUid": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(test_app.provider.requests().is_empty());
}

#[tokio::test]
async fn test_checkout_creates_session_for_client_share() {
    let test_app = setup_test_app().await;
    let id = create_booking(&test_app).await;
    let booking_id = BookingId::new(id.clone());
    test_app
        .repo
        .set_booking_status(&booking_id, BookingStatus::Confirmed)
        .await
        .unwrap();

    let (status, body) = request_json(
        &test_app.app,
        "POST",
        &format!("/v1/bookings/{}/checkout", id),
        Some(serde_json::json!({"clientUid": "alice"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["redirectUrl"], "https://checkout.test/cs_test_1");
    assert_eq!(
        body["urls"]["returnUrl"],
        format!("https://backline.test/bookings/{}", id)
    );

    let requests = test_app.provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_cents, 6001);
    assert_eq!(requests[0].client_uid, UserId::new("alice"));

    let booking = test_app
        .repo
        .get_split_booking(&booking_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.client_a_session_id.as_deref(), Some("cs_test_1"));
    assert_eq!(booking.client_b_session_id, None);
}

#[tokio::test]
async fn test_checkout_closed_for_paid_and_unknown_clients() {
    let test_app = setup_test_app().await;
    let id = create_booking(&test_app).await;
    let booking_id = BookingId::new(id.clone());
    test_app
        .repo
        .set_booking_status(&booking_id, BookingStatus::Confirmed)
        .await
        .unwrap();
    test_app
        .repo
        .set_payment_status(&booking_id, ClientSlot::A, PaymentStatus::Paid)
        .await
        .unwrap();

    let (status, _) = request_json(
        &test_app.app,
        "POST",
        &format!("/v1/bookings/{}/checkout", id),
        Some(serde_json::json!({"clientUid": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = request_json(
        &test_app.app,
        "POST",
        &format!("/v1/bookings/{}/checkout", id),
        Some(serde_json::json!({"clientUid": "mallory"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Bob still owes and can check out.
    let (status, body) = request_json(
        &test_app.app,
        "POST",
        &format!("/v1/bookings/{}/checkout", id),
        Some(serde_json::json!({"clientUid": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_1");

    let requests = test_app.provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount_cents, 4002);
}
