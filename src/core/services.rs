//! Implementations for the services the app needs.
//!

use crate::core::traits::{BookingService, ItemService, RequestService, UserService};
use crate::error::{AppError, AppResult};
use crate::infrastructure::entities::{
    Booking, BookingState, BookingStatus, CommentWithAuthor, CreateBooking, CreateComment,
    CreateItem, CreateRequest, CreateUser, Item, ItemOverview, ItemRequest, RequestWithItems,
    User,
};
use crate::infrastructure::traits::{
    BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, injectable};
use std::collections::HashMap;

#[injectable(BookingService)]
pub struct MyBookingService {
    bookings: Ref<dyn BookingRepository>,
    items: Ref<dyn ItemRepository>,
    users: Ref<dyn UserRepository>,
}

impl MyBookingService {
    async fn find_user(&self, user_id: i64) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
    }

    async fn find_item(&self, item_id: i64) -> AppResult<Item> {
        self.items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))
    }

    async fn find_booking(&self, booking_id: i64) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_owned()))
    }
}

#[async_trait]
impl BookingService for MyBookingService {
    async fn create_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let booker = self.find_user(booker_id).await?;
        let item = self.find_item(item_id).await?;

        if item.owner_id == booker.id {
            return Err(AppError::NotFound("You can not rent your item".to_owned()));
        }
        if !item.available {
            return Err(AppError::Conflict("Item is not available".to_owned()));
        }

        let candidate = CreateBooking {
            start_date: start,
            end_date: end,
            item_id: item.id,
            booker_id: booker.id,
            status: BookingStatus::Waiting,
        };
        // The interval is checked on the candidate record, after every
        // reference has been resolved. A booking reserves time ahead: the
        // start may be the present at the earliest, the end must still
        // lie ahead.
        let now = Utc::now();
        if candidate.start_date < now {
            return Err(AppError::Validation(
                "Booking start date must not be in the past".to_owned(),
            ));
        }
        if candidate.end_date <= now {
            return Err(AppError::Validation(
                "Booking end date must be in the future".to_owned(),
            ));
        }
        if candidate.start_date >= candidate.end_date {
            return Err(AppError::NotFound(
                "Booking end date can not be before start date".to_owned(),
            ));
        }

        if self
            .bookings
            .has_approved_overlap(item.id, candidate.start_date, candidate.end_date)
            .await?
        {
            return Err(AppError::NotFound("Overlapping".to_owned()));
        }

        // The store re-checks the overlap inside the insert statement;
        // `None` means a concurrent booking won the slot between our
        // check and the insert.
        self.bookings
            .create(candidate)
            .await?
            .ok_or_else(|| AppError::NotFound("Overlapping".to_owned()))
    }

    async fn update_booking_status(
        &self,
        owner_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<Booking> {
        let booking = self.find_booking(booking_id).await?;
        let item = self.find_item(booking.item_id).await?;

        if item.owner_id != owner_id {
            return Err(AppError::Conflict(
                "Only item owner can approve or reject booking".to_owned(),
            ));
        }

        let next = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        if !booking.status.can_transition(next) {
            return Err(AppError::Conflict(
                "Booking state must be WAITING".to_owned(),
            ));
        }

        // Compare-and-set against WAITING: a decision that slipped in
        // between the read above and this update loses the row and turns
        // into the same conflict.
        self.bookings
            .update_status(booking_id, BookingStatus::Waiting, next)
            .await?
            .ok_or_else(|| AppError::Conflict("Booking state must be WAITING".to_owned()))
    }

    async fn get_booking_by_id(&self, user_id: i64, booking_id: i64) -> AppResult<Booking> {
        let booking = self.find_booking(booking_id).await?;
        let item = self.find_item(booking.item_id).await?;

        if booking.booker_id != user_id && item.owner_id != user_id {
            return Err(AppError::NotFound(
                "User has no access to booking".to_owned(),
            ));
        }

        Ok(booking)
    }

    async fn get_bookings_by_state(
        &self,
        user_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<Booking>> {
        self.find_user(user_id).await?;

        let now = Utc::now();
        self.bookings.find_by_booker(user_id, state, now).await
    }

    async fn get_bookings_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<Booking>> {
        self.find_user(owner_id).await?;

        let item_ids: Vec<i64> = self
            .items
            .find_by_owner(owner_id)
            .await?
            .iter()
            .map(|item| item.id)
            .collect();
        // An empty id set must not reach the store; `IN ()` is not valid
        // SQL.
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        self.bookings.find_by_items(&item_ids, state, now).await
    }
}

#[injectable(ItemService)]
pub struct MyItemService {
    items: Ref<dyn ItemRepository>,
    users: Ref<dyn UserRepository>,
    bookings: Ref<dyn BookingRepository>,
    comments: Ref<dyn CommentRepository>,
    requests: Ref<dyn RequestRepository>,
}

impl MyItemService {
    async fn find_user(&self, user_id: i64) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
    }

    async fn find_item(&self, item_id: i64) -> AppResult<Item> {
        self.items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_owned()))
    }
}

#[async_trait]
impl ItemService for MyItemService {
    async fn create_item(
        &self,
        owner_id: i64,
        name: String,
        description: String,
        available: bool,
        request_id: Option<i64>,
    ) -> AppResult<Item> {
        self.find_user(owner_id).await?;

        if is_blank(&name) {
            return Err(AppError::Validation("Item name must not be blank".to_owned()));
        }
        if is_blank(&description) {
            return Err(AppError::Validation(
                "Item description must not be blank".to_owned(),
            ));
        }
        if let Some(request_id) = request_id {
            self.requests
                .find_by_id(request_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Request not found".to_owned()))?;
        }

        self.items
            .create(CreateItem {
                name,
                description,
                available,
                owner_id,
                request_id,
            })
            .await
    }

    async fn update_item(
        &self,
        actor_id: i64,
        item_id: i64,
        name: Option<String>,
        description: Option<String>,
        available: Option<bool>,
    ) -> AppResult<Item> {
        self.find_user(actor_id).await?;
        let mut item = self.find_item(item_id).await?;

        if item.owner_id != actor_id {
            return Err(AppError::NotFound(
                "Only the owner can update an item".to_owned(),
            ));
        }

        // Blank patch values are ignored rather than applied.
        if let Some(name) = name {
            if !is_blank(&name) {
                item.name = name;
            }
        }
        if let Some(description) = description {
            if !is_blank(&description) {
                item.description = description;
            }
        }
        if let Some(available) = available {
            item.available = available;
        }

        self.items.update(item).await
    }

    async fn get_item(&self, item_id: i64) -> AppResult<ItemOverview> {
        let item = self.find_item(item_id).await?;
        let comments = self.comments.find_by_item(item_id).await?;

        Ok(ItemOverview {
            item,
            last_booking: None,
            next_booking: None,
            comments,
        })
    }

    async fn list_for_owner(&self, owner_id: i64) -> AppResult<Vec<ItemOverview>> {
        let items = self.items.find_by_owner(owner_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        let now = Utc::now();

        let approved = self.bookings.find_approved_for_items(&item_ids).await?;
        let mut last_bookings: HashMap<i64, Booking> = HashMap::new();
        let mut next_bookings: HashMap<i64, Booking> = HashMap::new();
        for booking in approved {
            if booking.start_date <= now {
                // Latest started booking per item.
                let keep = last_bookings
                    .get(&booking.item_id)
                    .is_none_or(|last| last.start_date < booking.start_date);
                if keep {
                    last_bookings.insert(booking.item_id, booking);
                }
            } else {
                // Earliest upcoming booking per item.
                let keep = next_bookings
                    .get(&booking.item_id)
                    .is_none_or(|next| next.start_date > booking.start_date);
                if keep {
                    next_bookings.insert(booking.item_id, booking);
                }
            }
        }

        let mut comments_by_item: HashMap<i64, Vec<CommentWithAuthor>> = HashMap::new();
        for comment in self.comments.find_by_items(&item_ids).await? {
            comments_by_item
                .entry(comment.item_id)
                .or_default()
                .push(comment);
        }

        let overviews = items
            .into_iter()
            .map(|item| ItemOverview {
                last_booking: last_bookings.remove(&item.id),
                next_booking: next_bookings.remove(&item.id),
                comments: comments_by_item.remove(&item.id).unwrap_or_default(),
                item,
            })
            .collect();
        Ok(overviews)
    }

    async fn search_items(&self, text: &str) -> AppResult<Vec<Item>> {
        if is_blank(text) {
            return Ok(Vec::new());
        }
        self.items.search_available(text).await
    }

    async fn delete_item(&self, actor_id: i64, item_id: i64) -> AppResult<()> {
        let item = self.find_item(item_id).await?;

        if item.owner_id != actor_id {
            return Err(AppError::NotFound(
                "Only the owner can delete an item".to_owned(),
            ));
        }

        self.items.delete(item_id).await?;
        Ok(())
    }

    async fn add_comment(
        &self,
        author_id: i64,
        item_id: i64,
        text: String,
    ) -> AppResult<CommentWithAuthor> {
        if is_blank(&text) {
            return Err(AppError::Validation(
                "Comment text must not be blank".to_owned(),
            ));
        }

        let item = self.find_item(item_id).await?;
        let author = self.find_user(author_id).await?;

        let now = Utc::now();
        if !self
            .bookings
            .has_finished_booking(item.id, author.id, now)
            .await?
        {
            return Err(AppError::Validation(
                "User has no completed booking for this item".to_owned(),
            ));
        }

        let comment = self
            .comments
            .create(CreateComment {
                text,
                item_id: item.id,
                author_id: author.id,
                created: now,
            })
            .await?;

        Ok(CommentWithAuthor {
            id: comment.id,
            text: comment.text,
            item_id: comment.item_id,
            author_name: author.name,
            created: comment.created,
        })
    }
}

#[injectable(UserService)]
pub struct MyUserService {
    users: Ref<dyn UserRepository>,
}

impl MyUserService {
    async fn find_user(&self, user_id: i64) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
    }
}

#[async_trait]
impl UserService for MyUserService {
    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    async fn get_user(&self, user_id: i64) -> AppResult<User> {
        self.find_user(user_id).await
    }

    async fn create_user(&self, name: String, email: String) -> AppResult<User> {
        if is_blank(&name) {
            return Err(AppError::Validation("User name must not be blank".to_owned()));
        }
        if is_blank(&email) {
            return Err(AppError::Validation("Email must not be blank".to_owned()));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_owned()));
        }

        self.users.create(CreateUser { name, email }).await
    }

    async fn update_user(
        &self,
        user_id: i64,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut user = self.find_user(user_id).await?;

        if let Some(name) = name {
            if !is_blank(&name) {
                user.name = name;
            }
        }
        if let Some(email) = email {
            if !is_blank(&email) {
                if let Some(existing) = self.users.find_by_email(&email).await? {
                    if existing.id != user_id {
                        return Err(AppError::Conflict("Email already exists".to_owned()));
                    }
                }
                user.email = email;
            }
        }

        self.users.update(user).await
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound("User not found".to_owned()));
        }
        Ok(())
    }
}

#[injectable(RequestService)]
pub struct MyRequestService {
    requests: Ref<dyn RequestRepository>,
    items: Ref<dyn ItemRepository>,
    users: Ref<dyn UserRepository>,
}

impl MyRequestService {
    /// Groups responding items onto their requests, preserving request
    /// order.
    async fn attach_items(
        &self,
        requests: Vec<ItemRequest>,
    ) -> AppResult<Vec<RequestWithItems>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let request_ids: Vec<i64> = requests.iter().map(|request| request.id).collect();
        let mut items_by_request: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in self.items.find_by_request_ids(&request_ids).await? {
            if let Some(request_id) = item.request_id {
                items_by_request.entry(request_id).or_default().push(item);
            }
        }

        Ok(requests
            .into_iter()
            .map(|request| RequestWithItems {
                items: items_by_request.remove(&request.id).unwrap_or_default(),
                request,
            })
            .collect())
    }
}

#[async_trait]
impl RequestService for MyRequestService {
    async fn create_request(
        &self,
        requester_id: i64,
        description: String,
    ) -> AppResult<ItemRequest> {
        self.users
            .find_by_id(requester_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

        if is_blank(&description) {
            return Err(AppError::Validation(
                "Request description must not be blank".to_owned(),
            ));
        }

        self.requests
            .create(CreateRequest {
                description,
                requester_id,
                created: Utc::now(),
            })
            .await
    }

    async fn list_own_requests(&self, user_id: i64) -> AppResult<Vec<RequestWithItems>> {
        let requests = self.requests.find_by_requester(user_id).await?;
        self.attach_items(requests).await
    }

    async fn list_other_requests(&self, user_id: i64) -> AppResult<Vec<RequestWithItems>> {
        let requests = self.requests.find_by_other_requesters(user_id).await?;
        self.attach_items(requests).await
    }

    async fn get_request(&self, request_id: i64) -> AppResult<RequestWithItems> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_owned()))?;

        let items = self.items.find_by_request_ids(&[request.id]).await?;
        Ok(RequestWithItems { request, items })
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
