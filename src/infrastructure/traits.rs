//! Infrastructure traits, used for DI on higher levels

use crate::error::AppResult;
use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<entities::User>>;

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<entities::User>>;

    /// Email comparison is case-insensitive.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<entities::User>>;

    async fn create(&self, user: entities::CreateUser) -> AppResult<entities::User>;

    async fn update(&self, user: entities::User) -> AppResult<entities::User>;

    /// Returns `false` when no such user existed.
    async fn delete(&self, user_id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_by_id(&self, item_id: i64) -> AppResult<Option<entities::Item>>;

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<entities::Item>>;

    /// Items created in response to any of the given requests. The slice
    /// must not be empty.
    async fn find_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<entities::Item>>;

    /// Available items whose name or description contains `text`,
    /// case-insensitively.
    async fn search_available(&self, text: &str) -> AppResult<Vec<entities::Item>>;

    async fn create(&self, item: entities::CreateItem) -> AppResult<entities::Item>;

    async fn update(&self, item: entities::Item) -> AppResult<entities::Item>;

    async fn delete(&self, item_id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, booking_id: i64) -> AppResult<Option<entities::Booking>>;

    /// Bookings made by `booker_id`, narrowed by `state` relative to
    /// `now`, most recent start first.
    async fn find_by_booker(
        &self,
        booker_id: i64,
        state: entities::BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<entities::Booking>>;

    /// Bookings placed on any of the given items, narrowed by `state`
    /// relative to `now`, most recent start first. The slice must not be
    /// empty.
    async fn find_by_items(
        &self,
        item_ids: &[i64],
        state: entities::BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<entities::Booking>>;

    /// Whether an approved booking on the item intersects the half-open
    /// interval `[start, end)`.
    async fn has_approved_overlap(
        &self,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Inserts the booking unless an approved booking on the same item
    /// overlaps it at insert time. The overlap test and the insert run as
    /// one statement; `None` means a concurrent booking won the race.
    async fn create(&self, booking: entities::CreateBooking)
    -> AppResult<Option<entities::Booking>>;

    /// Compare-and-set on the status column. The row is updated only if
    /// its status still equals `expected`; `None` means it no longer did.
    async fn update_status(
        &self,
        booking_id: i64,
        expected: entities::BookingStatus,
        next: entities::BookingStatus,
    ) -> AppResult<Option<entities::Booking>>;

    /// All approved bookings on the given items, earliest start first.
    /// The slice must not be empty.
    async fn find_approved_for_items(
        &self,
        item_ids: &[i64],
    ) -> AppResult<Vec<entities::Booking>>;

    /// Whether the user has an approved booking on the item that ended
    /// before `now`.
    async fn has_finished_booking(
        &self,
        item_id: i64,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, request_id: i64) -> AppResult<Option<entities::ItemRequest>>;

    /// Requests made by the user, newest first.
    async fn find_by_requester(&self, requester_id: i64)
    -> AppResult<Vec<entities::ItemRequest>>;

    /// Requests made by everyone but the user, newest first.
    async fn find_by_other_requesters(
        &self,
        requester_id: i64,
    ) -> AppResult<Vec<entities::ItemRequest>>;

    async fn create(&self, request: entities::CreateRequest) -> AppResult<entities::ItemRequest>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Comments on the item with author names, oldest first.
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<entities::CommentWithAuthor>>;

    /// Comments on any of the given items, oldest first. The slice must
    /// not be empty.
    async fn find_by_items(
        &self,
        item_ids: &[i64],
    ) -> AppResult<Vec<entities::CommentWithAuthor>>;

    async fn create(&self, comment: entities::CreateComment) -> AppResult<entities::Comment>;
}
