//! DB Repository abstractions

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    Booking, BookingState, BookingStatus, Comment, CommentWithAuthor, CreateBooking,
    CreateComment, CreateItem, CreateRequest, CreateUser, Item, ItemRequest, User,
};
use crate::infrastructure::traits::{
    BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, injectable};
use sqlx::{QueryBuilder, Sqlite};

#[injectable(UserRepository)]
pub struct DbUserRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl UserRepository for DbUserRepository {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&**self.connection)
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        // The email column carries NOCASE collation, so `=` compares
        // case-insensitively.
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&**self.connection)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: CreateUser) -> AppResult<User> {
        sqlx::query_as("INSERT INTO users (name, email) VALUES (?, ?) RETURNING *")
            .bind(user.name)
            .bind(user.email)
            .fetch_one(&**self.connection)
            .await
            .map_err(map_email_conflict)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        sqlx::query_as("UPDATE users SET name = ?, email = ? WHERE id = ? RETURNING *")
            .bind(user.name)
            .bind(user.email)
            .bind(user.id)
            .fetch_one(&**self.connection)
            .await
            .map_err(map_email_conflict)
    }

    async fn delete(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&**self.connection)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The unique index on users.email turns a duplicate insert into a
/// business conflict rather than a plain database error.
fn map_email_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email already exists".to_owned())
        }
        other => AppError::Database(other),
    }
}

#[injectable(ItemRepository)]
pub struct DbItemRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ItemRepository for DbItemRepository {
    async fn find_by_id(&self, item_id: i64) -> AppResult<Option<Item>> {
        let item = sqlx::query_as("SELECT * FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&**self.connection)
            .await?;
        Ok(item)
    }

    async fn find_by_owner(&self, owner_id: i64) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as("SELECT * FROM items WHERE owner_id = ? ORDER BY id ASC")
            .bind(owner_id)
            .fetch_all(&**self.connection)
            .await?;
        Ok(items)
    }

    async fn find_by_request_ids(&self, request_ids: &[i64]) -> AppResult<Vec<Item>> {
        let mut builder = QueryBuilder::new("SELECT * FROM items WHERE request_id IN (");
        let mut ids = builder.separated(", ");
        for request_id in request_ids {
            ids.push_bind(*request_id);
        }
        ids.push_unseparated(")");
        builder.push(" ORDER BY id ASC");

        let items = builder
            .build_query_as::<Item>()
            .fetch_all(&**self.connection)
            .await?;
        Ok(items)
    }

    async fn search_available(&self, text: &str) -> AppResult<Vec<Item>> {
        let pattern = format!("%{text}%");
        let items = sqlx::query_as(
            "SELECT * FROM items WHERE is_available = 1 AND (name LIKE ? OR description LIKE ?) ORDER BY id ASC",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&**self.connection)
        .await?;
        Ok(items)
    }

    async fn create(&self, item: CreateItem) -> AppResult<Item> {
        let item = sqlx::query_as(
            "INSERT INTO items (name, description, is_available, owner_id, request_id) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.available)
        .bind(item.owner_id)
        .bind(item.request_id)
        .fetch_one(&**self.connection)
        .await?;
        Ok(item)
    }

    async fn update(&self, item: Item) -> AppResult<Item> {
        let item = sqlx::query_as(
            "UPDATE items SET name = ?, description = ?, is_available = ? WHERE id = ? RETURNING *",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.available)
        .bind(item.id)
        .fetch_one(&**self.connection)
        .await?;
        Ok(item)
    }

    async fn delete(&self, item_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&**self.connection)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[injectable(BookingRepository)]
pub struct DbBookingRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl BookingRepository for DbBookingRepository {
    async fn find_by_id(&self, booking_id: i64) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
            .bind(booking_id)
            .fetch_optional(&**self.connection)
            .await?;
        Ok(booking)
    }

    async fn find_by_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let mut builder = QueryBuilder::new("SELECT * FROM bookings WHERE booker_id = ");
        builder.push_bind(booker_id);
        push_state_filter(&mut builder, state, now);
        builder.push(" ORDER BY datetime(start_date) DESC, id DESC");

        let bookings = builder
            .build_query_as::<Booking>()
            .fetch_all(&**self.connection)
            .await?;
        Ok(bookings)
    }

    async fn find_by_items(
        &self,
        item_ids: &[i64],
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Booking>> {
        let mut builder = QueryBuilder::new("SELECT * FROM bookings WHERE item_id IN (");
        let mut ids = builder.separated(", ");
        for item_id in item_ids {
            ids.push_bind(*item_id);
        }
        ids.push_unseparated(")");
        push_state_filter(&mut builder, state, now);
        builder.push(" ORDER BY datetime(start_date) DESC, id DESC");

        let bookings = builder
            .build_query_as::<Booking>()
            .fetch_all(&**self.connection)
            .await?;
        Ok(bookings)
    }

    async fn has_approved_overlap(
        &self,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool> {
        // Compared at millisecond precision; datetime() renders whole
        // seconds only and would let sub-second overlaps through.
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE item_id = ? AND status = ? \
             AND strftime('%Y-%m-%d %H:%M:%f', end_date) > strftime('%Y-%m-%d %H:%M:%f', ?) \
             AND strftime('%Y-%m-%d %H:%M:%f', start_date) < strftime('%Y-%m-%d %H:%M:%f', ?))",
        )
        .bind(item_id)
        .bind(BookingStatus::Approved)
        .bind(start)
        .bind(end)
        .fetch_one(&**self.connection)
        .await?;
        Ok(exists.0)
    }

    async fn create(&self, booking: CreateBooking) -> AppResult<Option<Booking>> {
        // The insert and the overlap test form one statement, so two
        // overlapping requests cannot both pass the test and both insert.
        let created = sqlx::query_as(
            "INSERT INTO bookings (start_date, end_date, item_id, booker_id, status) \
             SELECT ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM bookings WHERE item_id = ? AND status = ? \
             AND strftime('%Y-%m-%d %H:%M:%f', end_date) > strftime('%Y-%m-%d %H:%M:%f', ?) \
             AND strftime('%Y-%m-%d %H:%M:%f', start_date) < strftime('%Y-%m-%d %H:%M:%f', ?)) \
             RETURNING *",
        )
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(booking.status)
        .bind(booking.item_id)
        .bind(BookingStatus::Approved)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .fetch_optional(&**self.connection)
        .await?;
        Ok(created)
    }

    async fn update_status(
        &self,
        booking_id: i64,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let updated = sqlx::query_as(
            "UPDATE bookings SET status = ? WHERE id = ? AND status = ? RETURNING *",
        )
        .bind(next)
        .bind(booking_id)
        .bind(expected)
        .fetch_optional(&**self.connection)
        .await?;
        Ok(updated)
    }

    async fn find_approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        let mut builder = QueryBuilder::new("SELECT * FROM bookings WHERE status = ");
        builder.push_bind(BookingStatus::Approved);
        builder.push(" AND item_id IN (");
        let mut ids = builder.separated(", ");
        for item_id in item_ids {
            ids.push_bind(*item_id);
        }
        ids.push_unseparated(")");
        builder.push(" ORDER BY datetime(start_date) ASC, id ASC");

        let bookings = builder
            .build_query_as::<Booking>()
            .fetch_all(&**self.connection)
            .await?;
        Ok(bookings)
    }

    async fn has_finished_booking(
        &self,
        item_id: i64,
        booker_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE item_id = ? AND booker_id = ? AND status = ? \
             AND strftime('%Y-%m-%d %H:%M:%f', end_date) < strftime('%Y-%m-%d %H:%M:%f', ?))",
        )
        .bind(item_id)
        .bind(booker_id)
        .bind(BookingStatus::Approved)
        .bind(now)
        .fetch_one(&**self.connection)
        .await?;
        Ok(exists.0)
    }
}

/// Narrows a booking query by the requested state. Both listing paths
/// (by booker and by item set) go through this one filter, so a state
/// means the same thing in each. The temporal states compare at
/// millisecond precision, like the overlap guard.
fn push_state_filter(builder: &mut QueryBuilder<'_, Sqlite>, state: BookingState, now: DateTime<Utc>) {
    match state {
        BookingState::All => {}
        BookingState::Current => {
            builder.push(" AND strftime('%Y-%m-%d %H:%M:%f', start_date) <= strftime('%Y-%m-%d %H:%M:%f', ");
            builder.push_bind(now);
            builder.push(") AND strftime('%Y-%m-%d %H:%M:%f', end_date) > strftime('%Y-%m-%d %H:%M:%f', ");
            builder.push_bind(now);
            builder.push(")");
        }
        BookingState::Past => {
            builder.push(" AND strftime('%Y-%m-%d %H:%M:%f', end_date) < strftime('%Y-%m-%d %H:%M:%f', ");
            builder.push_bind(now);
            builder.push(")");
        }
        BookingState::Future => {
            builder.push(" AND strftime('%Y-%m-%d %H:%M:%f', start_date) > strftime('%Y-%m-%d %H:%M:%f', ");
            builder.push_bind(now);
            builder.push(")");
        }
        BookingState::Waiting => {
            builder.push(" AND status = ");
            builder.push_bind(BookingStatus::Waiting);
        }
        BookingState::Rejected => {
            builder.push(" AND status = ");
            builder.push_bind(BookingStatus::Rejected);
        }
    }
}

#[injectable(RequestRepository)]
pub struct DbRequestRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl RequestRepository for DbRequestRepository {
    async fn find_by_id(&self, request_id: i64) -> AppResult<Option<ItemRequest>> {
        let request = sqlx::query_as("SELECT * FROM requests WHERE id = ?")
            .bind(request_id)
            .fetch_optional(&**self.connection)
            .await?;
        Ok(request)
    }

    async fn find_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as(
            "SELECT * FROM requests WHERE requester_id = ? ORDER BY datetime(created) DESC, id DESC",
        )
        .bind(requester_id)
        .fetch_all(&**self.connection)
        .await?;
        Ok(requests)
    }

    async fn find_by_other_requesters(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let requests = sqlx::query_as(
            "SELECT * FROM requests WHERE requester_id != ? ORDER BY datetime(created) DESC, id DESC",
        )
        .bind(requester_id)
        .fetch_all(&**self.connection)
        .await?;
        Ok(requests)
    }

    async fn create(&self, request: CreateRequest) -> AppResult<ItemRequest> {
        let request = sqlx::query_as(
            "INSERT INTO requests (description, requester_id, created) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(request.description)
        .bind(request.requester_id)
        .bind(request.created)
        .fetch_one(&**self.connection)
        .await?;
        Ok(request)
    }
}

#[injectable(CommentRepository)]
pub struct DbCommentRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl CommentRepository for DbCommentRepository {
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as(
            "SELECT comments.id, comments.text, comments.item_id, users.name AS author_name, comments.created FROM comments INNER JOIN users ON users.id = comments.author_id WHERE comments.item_id = ? ORDER BY datetime(comments.created) ASC, comments.id ASC",
        )
        .bind(item_id)
        .fetch_all(&**self.connection)
        .await?;
        Ok(comments)
    }

    async fn find_by_items(&self, item_ids: &[i64]) -> AppResult<Vec<CommentWithAuthor>> {
        let mut builder = QueryBuilder::new(
            "SELECT comments.id, comments.text, comments.item_id, users.name AS author_name, comments.created FROM comments INNER JOIN users ON users.id = comments.author_id WHERE comments.item_id IN (",
        );
        let mut ids = builder.separated(", ");
        for item_id in item_ids {
            ids.push_bind(*item_id);
        }
        ids.push_unseparated(")");
        builder.push(" ORDER BY datetime(comments.created) ASC, comments.id ASC");

        let comments = builder
            .build_query_as::<CommentWithAuthor>()
            .fetch_all(&**self.connection)
            .await?;
        Ok(comments)
    }

    async fn create(&self, comment: CreateComment) -> AppResult<Comment> {
        let comment = sqlx::query_as(
            "INSERT INTO comments (text, item_id, author_id, created) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(comment.text)
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(comment.created)
        .fetch_one(&**self.connection)
        .await?;
        Ok(comment)
    }
}
