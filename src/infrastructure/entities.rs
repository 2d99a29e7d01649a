//! Database entities

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[sqlx(rename = "is_available")]
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// Persisted status of a booking. `Waiting` is the only state a booking
/// can leave; `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    /// The transition table of the booking lifecycle. Every status change
    /// in the system is checked against this one function.
    pub fn can_transition(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Waiting, BookingStatus::Approved)
                | (BookingStatus::Waiting, BookingStatus::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::Rejected)
    }
}

/// Query-time classification of bookings. Unlike [`BookingStatus`] this is
/// never persisted; it only selects which slice of the booking history a
/// listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
}

/// A comment joined with its author's display name.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// An item together with its booking outlook and comments, as shown to
/// the item's owner.
#[derive(Debug)]
pub struct ItemOverview {
    pub item: Item,
    pub last_booking: Option<Booking>,
    pub next_booking: Option<Booking>,
    pub comments: Vec<CommentWithAuthor>,
}

/// An item request together with the items offered in response to it.
#[derive(Debug)]
pub struct RequestWithItems {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}

/// Insert payload for a booking. The id is assigned by the database.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
}
