//! DI "Interfaces"

use crate::error::AppResult;
use crate::infrastructure::entities;
use crate::infrastructure::entities::{BookingState, CommentWithAuthor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Places a booking request for an item. The new booking starts out
    /// `WAITING` until the item owner decides on it.
    ///
    /// Returns `Err` if the booker or item is unknown, the booker owns the
    /// item, the item is not available for rent, the interval is empty or
    /// inverted, or an approved booking already overlaps `[start, end)`.
    async fn create_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<entities::Booking>;

    /// Approves or rejects a waiting booking.
    ///
    /// Returns `Err` unless the caller owns the booked item and the
    /// booking is still `WAITING`.
    async fn update_booking_status(
        &self,
        owner_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<entities::Booking>;

    /// Fetches a single booking. Only its booker and the item owner may
    /// see it; to anyone else it does not exist.
    async fn get_booking_by_id(
        &self,
        user_id: i64,
        booking_id: i64,
    ) -> AppResult<entities::Booking>;

    /// Lists the user's own bookings narrowed by `state`, most recent
    /// start first.
    async fn get_bookings_by_state(
        &self,
        user_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<entities::Booking>>;

    /// Lists bookings placed on any item the user owns, narrowed by
    /// `state`, most recent start first.
    async fn get_bookings_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<entities::Booking>>;
}

#[async_trait]
pub trait ItemService: Send + Sync {
    /// Registers a new item owned by `owner_id`. When `request_id` is
    /// given the item answers that request.
    async fn create_item(
        &self,
        owner_id: i64,
        name: String,
        description: String,
        available: bool,
        request_id: Option<i64>,
    ) -> AppResult<entities::Item>;

    /// Applies the given fields to an item. Only the owner may update.
    async fn update_item(
        &self,
        actor_id: i64,
        item_id: i64,
        name: Option<String>,
        description: Option<String>,
        available: Option<bool>,
    ) -> AppResult<entities::Item>;

    /// Fetches an item with its comments. The booking outlook is left
    /// empty; it is only compiled for the owner listing.
    async fn get_item(&self, item_id: i64) -> AppResult<entities::ItemOverview>;

    /// Lists the user's items, each with its latest and next approved
    /// booking and its comments.
    async fn list_for_owner(&self, owner_id: i64) -> AppResult<Vec<entities::ItemOverview>>;

    /// Available items matching `text` in name or description. A blank
    /// query matches nothing.
    async fn search_items(&self, text: &str) -> AppResult<Vec<entities::Item>>;

    /// Removes an item. Only the owner may delete.
    async fn delete_item(&self, actor_id: i64, item_id: i64) -> AppResult<()>;

    /// Leaves a comment on an item the user has actually rented: an
    /// approved booking of theirs must have ended already.
    async fn add_comment(
        &self,
        author_id: i64,
        item_id: i64,
        text: String,
    ) -> AppResult<CommentWithAuthor>;
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_all_users(&self) -> AppResult<Vec<entities::User>>;

    async fn get_user(&self, user_id: i64) -> AppResult<entities::User>;

    /// Creates a user. Emails are unique, ignoring case.
    async fn create_user(&self, name: String, email: String) -> AppResult<entities::User>;

    /// Applies the given fields to a user. A new email must not collide
    /// with another user's.
    async fn update_user(
        &self,
        user_id: i64,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<entities::User>;

    async fn delete_user(&self, user_id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait RequestService: Send + Sync {
    /// Files a request for an item nobody has listed yet.
    async fn create_request(
        &self,
        requester_id: i64,
        description: String,
    ) -> AppResult<entities::ItemRequest>;

    /// The user's own requests, newest first, each with the items offered
    /// in response.
    async fn list_own_requests(&self, user_id: i64)
    -> AppResult<Vec<entities::RequestWithItems>>;

    /// Everyone else's requests, newest first, each with the items
    /// offered in response.
    async fn list_other_requests(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<entities::RequestWithItems>>;

    /// A single request with its responding items.
    async fn get_request(&self, request_id: i64) -> AppResult<entities::RequestWithItems>;
}
