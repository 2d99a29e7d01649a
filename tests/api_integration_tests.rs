//! API Integration Tests
//!
//! Tests the HTTP API endpoints with a real database.
//!
//! Tests are serialized because they share a global test pool.
//!
//! Note: The `more-di` DI framework doesn't support injecting custom pools.
//! We work around this by using `DatabaseConnection::set_test_pool()` to set
//! a global pool that the DI-created DatabaseConnection will use.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use rental_market_api::{
    api,
    core::services::{MyBookingService, MyItemService, MyRequestService, MyUserService},
    infrastructure::database::DatabaseConnection,
    infrastructure::entities::BookingStatus,
    infrastructure::repositories::{
        DbBookingRepository, DbCommentRepository, DbItemRepository, DbRequestRepository,
        DbUserRepository,
    },
};
use serde_json::{Value, json};
use serial_test::serial;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Setup test database with migrations and returns pool
/// Uses in-memory SQLite for test isolation
async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    // Use file URI format with shared cache - each test gets a unique DB
    let db_url = format!("sqlite:file:testdb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    // Set this pool as the global test pool so DI uses it
    DatabaseConnection::set_test_pool(pool.clone());

    pool
}

/// Clean up after test
fn cleanup_test_db() {
    DatabaseConnection::clear_test_pool();
}

/// Create test app - uses the global test pool set by setup_test_db()
fn create_test_app() -> axum::Router {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::transient())
        .add(DbUserRepository::scoped())
        .add(DbItemRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbRequestRepository::scoped())
        .add(DbCommentRepository::scoped())
        .add(MyBookingService::scoped())
        .add(MyItemService::scoped())
        .add(MyUserService::scoped())
        .add(MyRequestService::scoped())
        .build_provider()
        .unwrap();

    axum::Router::new()
        .nest("/bookings", api::bookings::router())
        .nest("/items", api::items::router())
        .nest("/users", api::users::router())
        .nest("/requests", api::requests::router())
        .with_provider(provider)
}

/// Sends one request through a fresh app and decodes the response. Plain
/// text error bodies come back as `Value::Null`.
async fn request(
    method: Method,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("X-Sharer-User-Id", user_id.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = create_test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_user(name: &str, email: &str) -> i64 {
    let (status, user) = request(
        Method::POST,
        "/users",
        None,
        Some(json!({"name": name, "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user["id"].as_i64().unwrap()
}

async fn create_item(owner_id: i64, name: &str, available: bool) -> i64 {
    let (status, item) = request(
        Method::POST,
        "/items",
        Some(owner_id),
        Some(json!({
            "name": name,
            "description": format!("{name} for rent"),
            "available": available,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    item["id"].as_i64().unwrap()
}

async fn seed_booking(
    pool: &SqlitePool,
    item_id: i64,
    booker_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: BookingStatus,
) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO bookings (start_date, end_date, item_id, booker_id, status) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(start)
    .bind(end)
    .bind(item_id)
    .bind(booker_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

#[tokio::test]
#[serial]
async fn test_user_crud_roundtrip() {
    let _pool = setup_test_db().await;

    let (status, user) = request(
        Method::POST,
        "/users",
        None,
        Some(json!({"name": "Ann", "email": "ann@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Ann");
    assert_eq!(user["email"], "ann@example.com");
    let user_id = user["id"].as_i64().unwrap();

    let (status, fetched) = request(Method::GET, &format!("/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Ann");

    let (status, updated) = request(
        Method::PATCH,
        &format!("/users/{user_id}"),
        None,
        Some(json!({"email": "ann@new.example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "ann@new.example.com");
    assert_eq!(updated["name"], "Ann");

    let (status, all) = request(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = request(Method::DELETE, &format!("/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(Method::GET, &format!("/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, _) = request(Method::DELETE, &format!("/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_duplicate_email_is_a_conflict() {
    let _pool = setup_test_db().await;

    let ann = create_user("Ann", "ann@example.com").await;
    let bob = create_user("Bob", "bob@example.com").await;

    // Same address, different case.
    let (status, body) = request(
        Method::POST,
        "/users",
        None,
        Some(json!({"name": "Impostor", "email": "ANN@EXAMPLE.COM"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");

    let (status, body) = request(
        Method::PATCH,
        &format!("/users/{bob}"),
        None,
        Some(json!({"email": "Ann@Example.Com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");

    // Updating a user to their own email is not a collision.
    let (status, _) = request(
        Method::PATCH,
        &format!("/users/{ann}"),
        None,
        Some(json!({"email": "ANN@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_create_user_validation() {
    let _pool = setup_test_db().await;

    let (status, body) = request(
        Method::POST,
        "/users",
        None,
        Some(json!({"name": "  ", "email": "ok@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User name must not be blank");

    let (status, body) = request(
        Method::POST,
        "/users",
        None,
        Some(json!({"name": "Ann", "email": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email must not be blank");

    // Missing field is rejected by the JSON extractor.
    let (status, _) = request(Method::POST, "/users", None, Some(json!({"name": "Ann"}))).await;
    assert!(status.is_client_error());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_booking_lifecycle() {
    let _pool = setup_test_db().await;

    let owner = create_user("Owner", "owner@example.com").await;
    let booker = create_user("Booker", "booker@example.com").await;
    let stranger = create_user("Stranger", "stranger@example.com").await;
    let item = create_item(owner, "Drill", true).await;

    let start = Utc::now() + Duration::days(1);
    let end = Utc::now() + Duration::days(3);

    let (status, booking) = request(
        Method::POST,
        "/bookings",
        Some(booker),
        Some(json!({
            "itemId": item,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "WAITING");
    assert_eq!(booking["itemId"], item);
    assert_eq!(booking["bookerId"], booker);
    let booking_id = booking["id"].as_i64().unwrap();

    // Only the participants can see the booking.
    let (status, body) = request(
        Method::GET,
        &format!("/bookings/{booking_id}"),
        Some(stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User has no access to booking");

    let (status, body) = request(
        Method::GET,
        &format!("/bookings/{booking_id}"),
        Some(booker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], booking_id);

    // The booker cannot decide on their own booking.
    let (status, body) = request(
        Method::PATCH,
        &format!("/bookings/{booking_id}?approved=true"),
        Some(booker),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Only item owner can approve or reject booking");

    let (status, body) = request(
        Method::PATCH,
        &format!("/bookings/{booking_id}?approved=true"),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    // The decision is final.
    let (status, body) = request(
        Method::PATCH,
        &format!("/bookings/{booking_id}?approved=false"),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Booking state must be WAITING");

    // The approved interval is now reserved.
    let (status, body) = request(
        Method::POST,
        "/bookings",
        Some(stranger),
        Some(json!({
            "itemId": item,
            "start": (start + Duration::days(1)).to_rfc3339(),
            "end": (end + Duration::days(1)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Overlapping");

    // A booking that starts exactly at the end is allowed.
    let (status, second) = request(
        Method::POST,
        "/bookings",
        Some(stranger),
        Some(json!({
            "itemId": item,
            "start": end.to_rfc3339(),
            "end": (end + Duration::days(1)).to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_id = second["id"].as_i64().unwrap();

    // Default state is ALL.
    let (status, list) = request(Method::GET, "/bookings", Some(booker), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Owner sees bookings on all their items, most recent start first.
    let (status, list) = request(Method::GET, "/bookings/owner", Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second_id);
    assert_eq!(list[1]["id"], booking_id);

    let (status, list) = request(
        Method::GET,
        "/bookings/owner?state=WAITING",
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], second_id);

    // An owner of nothing gets an empty list.
    let (status, list) = request(Method::GET, "/bookings/owner", Some(stranger), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 0);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_booking_business_gates() {
    let _pool = setup_test_db().await;

    let owner = create_user("Owner", "owner@example.com").await;
    let booker = create_user("Booker", "booker@example.com").await;
    let drill = create_item(owner, "Drill", true).await;
    let saw = create_item(owner, "Saw", false).await;

    let start = Utc::now() + Duration::days(1);
    let end = Utc::now() + Duration::days(2);
    let body = |item: i64, start: DateTime<Utc>, end: DateTime<Utc>| {
        json!({"itemId": item, "start": start.to_rfc3339(), "end": end.to_rfc3339()})
    };

    // Booking your own item is hidden behind a 404.
    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(owner),
        Some(body(drill, start, end)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "You can not rent your item");

    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(booker),
        Some(body(saw, start, end)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "Item is not available");

    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(booker),
        Some(body(drill, start, start)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "Booking end date can not be before start date");

    // Dates behind the clock are a plain validation failure.
    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(booker),
        Some(body(drill, start - Duration::days(3), end - Duration::days(3))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Booking start date must not be in the past");

    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(booker),
        Some(body(999, start, end)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "Item not found");

    let (status, response) = request(
        Method::POST,
        "/bookings",
        Some(999),
        Some(body(drill, start, end)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "User not found");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_request_plumbing_rejections() {
    let _pool = setup_test_db().await;

    // Missing X-Sharer-User-Id header.
    let (status, _) = request(Method::GET, "/bookings", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A state outside the closed set is refused, not defaulted.
    let (status, _) = request(Method::GET, "/bookings?state=SOMEDAY", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The approved flag is mandatory.
    let (status, _) = request(Method::PATCH, "/bookings/1", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Non-numeric path id.
    let (status, _) = request(Method::GET, "/items/drill", Some(1), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Body missing a required field.
    let (status, _) = request(
        Method::POST,
        "/bookings",
        Some(1),
        Some(json!({"start": Utc::now().to_rfc3339()})),
    )
    .await;
    assert!(status.is_client_error());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_items_owner_view_and_search() {
    let pool = setup_test_db().await;

    let owner = create_user("Owner", "owner@example.com").await;
    let renter = create_user("Renter", "renter@example.com").await;
    let drill = create_item(owner, "Drill", true).await;
    let saw = create_item(owner, "Saw", false).await;

    let now = Utc::now();
    let last_id = seed_booking(
        &pool,
        drill,
        renter,
        now - Duration::days(3),
        now - Duration::days(1),
        BookingStatus::Approved,
    )
    .await;
    let next_id = seed_booking(
        &pool,
        drill,
        renter,
        now + Duration::days(1),
        now + Duration::days(2),
        BookingStatus::Approved,
    )
    .await;

    // The owner listing carries the booking outlook per item.
    let (status, list) = request(Method::GET, "/items", Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], drill);
    assert_eq!(list[0]["lastBooking"]["id"], last_id);
    assert_eq!(list[0]["nextBooking"]["id"], next_id);
    assert_eq!(list[1]["id"], saw);
    assert!(list[1]["lastBooking"].is_null());
    assert!(list[1]["nextBooking"].is_null());

    // A single item fetch does not compile the outlook.
    let (status, single) = request(Method::GET, &format!("/items/{drill}"), Some(renter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["name"], "Drill");
    assert!(single["lastBooking"].is_null());
    assert_eq!(single["comments"].as_array().unwrap().len(), 0);

    // Search is case-insensitive and skips unavailable items.
    let (status, found) = request(Method::GET, "/items/search?text=dRiLl", Some(renter), None).await;
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], drill);

    let (_, found) = request(Method::GET, "/items/search?text=saw", Some(renter), None).await;
    assert_eq!(found.as_array().unwrap().len(), 0);

    let (status, _) = request(Method::GET, "/items/search", Some(renter), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, found) = request(Method::GET, "/items/search?text=", Some(renter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 0);

    // Only the owner may change an item.
    let (status, body) = request(
        Method::PATCH,
        &format!("/items/{drill}"),
        Some(renter),
        Some(json!({"available": false})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Only the owner can update an item");

    let (status, updated) = request(
        Method::PATCH,
        &format!("/items/{drill}"),
        Some(owner),
        Some(json!({"description": "Cordless drill"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Drill");
    assert_eq!(updated["description"], "Cordless drill");

    let (status, updated) = request(
        Method::PATCH,
        &format!("/items/{drill}"),
        Some(owner),
        Some(json!({"available": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["available"], false);

    let (_, found) = request(Method::GET, "/items/search?text=drill", Some(renter), None).await;
    assert_eq!(found.as_array().unwrap().len(), 0);

    // Deleting is owner-only as well.
    let (status, _) = request(Method::DELETE, &format!("/items/{drill}"), Some(renter), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(Method::DELETE, &format!("/items/{drill}"), Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(Method::GET, &format!("/items/{drill}"), Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_comments_require_a_finished_booking() {
    let pool = setup_test_db().await;

    let owner = create_user("Owner", "owner@example.com").await;
    let renter = create_user("Renter", "renter@example.com").await;
    let drill = create_item(owner, "Drill", true).await;

    let comment = json!({"text": "Great drill"});

    // No booking at all.
    let (status, body) = request(
        Method::POST,
        &format!("/items/{drill}/comment"),
        Some(renter),
        Some(comment.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User has no completed booking for this item");

    // An approved booking that has not ended yet is not enough.
    let now = Utc::now();
    seed_booking(
        &pool,
        drill,
        renter,
        now + Duration::days(1),
        now + Duration::days(2),
        BookingStatus::Approved,
    )
    .await;
    let (status, _) = request(
        Method::POST,
        &format!("/items/{drill}/comment"),
        Some(renter),
        Some(comment.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    seed_booking(
        &pool,
        drill,
        renter,
        now - Duration::days(3),
        now - Duration::days(2),
        BookingStatus::Approved,
    )
    .await;
    let (status, posted) = request(
        Method::POST,
        &format!("/items/{drill}/comment"),
        Some(renter),
        Some(comment),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posted["text"], "Great drill");
    assert_eq!(posted["authorName"], "Renter");

    let (status, body) = request(
        Method::POST,
        &format!("/items/{drill}/comment"),
        Some(renter),
        Some(json!({"text": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Comment text must not be blank");

    let (_, single) = request(Method::GET, &format!("/items/{drill}"), Some(renter), None).await;
    let comments = single["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["authorName"], "Renter");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_item_requests_flow() {
    let _pool = setup_test_db().await;

    let alice = create_user("Alice", "alice@example.com").await;
    let bob = create_user("Bob", "bob@example.com").await;

    let (status, _) = request(Method::POST, "/requests", None, Some(json!({"description": "x"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        Method::POST,
        "/requests",
        Some(999),
        Some(json!({"description": "Need a ladder"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = request(
        Method::POST,
        "/requests",
        Some(alice),
        Some(json!({"description": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request description must not be blank");

    let (status, created) = request(
        Method::POST,
        "/requests",
        Some(alice),
        Some(json!({"description": "Need a ladder"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["description"], "Need a ladder");
    assert_eq!(created["items"].as_array().unwrap().len(), 0);
    let request_id = created["id"].as_i64().unwrap();

    // Bob answers the request with an item.
    let (status, ladder) = request(
        Method::POST,
        "/items",
        Some(bob),
        Some(json!({
            "name": "Ladder",
            "description": "Sturdy 3m ladder",
            "available": true,
            "requestId": request_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ladder["requestId"], request_id);
    let ladder_id = ladder["id"].as_i64().unwrap();

    // An unknown request cannot be answered.
    let (status, body) = request(
        Method::POST,
        "/items",
        Some(bob),
        Some(json!({
            "name": "Rope",
            "description": "Climbing rope",
            "available": true,
            "requestId": 999,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Request not found");

    // Own requests carry the responding items.
    let (status, own) = request(Method::GET, "/requests", Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 1);
    let items = own[0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], ladder_id);
    assert_eq!(items[0]["ownerId"], bob);

    // /all shows everyone else's requests.
    let (_, own) = request(Method::GET, "/requests", Some(bob), None).await;
    assert_eq!(own.as_array().unwrap().len(), 0);

    let (_, others) = request(Method::GET, "/requests/all", Some(bob), None).await;
    assert_eq!(others.as_array().unwrap().len(), 1);

    let (_, others) = request(Method::GET, "/requests/all", Some(alice), None).await;
    assert_eq!(others.as_array().unwrap().len(), 0);

    let (status, one) = request(
        Method::GET,
        &format!("/requests/{request_id}"),
        Some(bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["items"].as_array().unwrap().len(), 1);

    let (status, body) = request(Method::GET, "/requests/999", Some(alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Request not found");

    // Newest request first.
    let (status, _) = request(
        Method::POST,
        "/requests",
        Some(alice),
        Some(json!({"description": "Need a wheelbarrow"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, own) = request(Method::GET, "/requests", Some(alice), None).await;
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 2);
    assert_eq!(own[0]["description"], "Need a wheelbarrow");
    assert_eq!(own[1]["description"], "Need a ladder");

    cleanup_test_db();
}
