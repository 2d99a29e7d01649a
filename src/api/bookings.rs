//! Booking endpoints

use crate::api::ExtractUser;
use crate::api::bookings::schemas::{ApprovalParams, CreateBooking, StateParams};
use crate::core::traits::BookingService;
use crate::error::AppError;
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_bookings_by_state).post(create_booking))
        .route("/owner", get(get_bookings_for_owner))
        .route(
            "/:booking_id",
            get(get_booking_by_id).patch(update_booking_status),
        )
}

async fn create_booking(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Json(create_booking): Json<CreateBooking>,
) -> Result<Json<schemas::Booking>, AppError> {
    debug!(
        "create booking for item {} by user {}",
        create_booking.item_id, current_user
    );
    let booking = booking_service
        .create_booking(
            current_user,
            create_booking.item_id,
            create_booking.start,
            create_booking.end,
        )
        .await?;
    Ok(Json(booking.into()))
}

async fn update_booking_status(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Path(booking_id): Path<i64>,
    Query(params): Query<ApprovalParams>,
) -> Result<Json<schemas::Booking>, AppError> {
    debug!(
        "set booking {} approved={} by user {}",
        booking_id, params.approved, current_user
    );
    let booking = booking_service
        .update_booking_status(current_user, booking_id, params.approved)
        .await?;
    Ok(Json(booking.into()))
}

async fn get_booking_by_id(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<schemas::Booking>, AppError> {
    debug!("get booking {} for user {}", booking_id, current_user);
    let booking = booking_service
        .get_booking_by_id(current_user, booking_id)
        .await?;
    Ok(Json(booking.into()))
}

async fn get_bookings_by_state(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Query(params): Query<StateParams>,
) -> Result<Json<Vec<schemas::Booking>>, AppError> {
    debug!(
        "get bookings of user {} in state {:?}",
        current_user, params.state
    );
    let bookings = booking_service
        .get_bookings_by_state(current_user, params.state.into())
        .await?;
    Ok(Json(
        bookings.into_iter().map(schemas::Booking::from).collect(),
    ))
}

async fn get_bookings_for_owner(
    Inject(booking_service): Inject<dyn BookingService>,
    ExtractUser(current_user): ExtractUser,
    Query(params): Query<StateParams>,
) -> Result<Json<Vec<schemas::Booking>>, AppError> {
    debug!(
        "get bookings on items of owner {} in state {:?}",
        current_user, params.state
    );
    let bookings = booking_service
        .get_bookings_for_owner(current_user, params.state.into())
        .await?;
    Ok(Json(
        bookings.into_iter().map(schemas::Booking::from).collect(),
    ))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateBooking {
        pub item_id: i64,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
    }

    #[derive(Deserialize, Debug)]
    pub struct ApprovalParams {
        pub approved: bool,
    }

    #[derive(Deserialize, Debug)]
    pub struct StateParams {
        #[serde(default)]
        pub state: BookingState,
    }

    /// Wire form of the state filter. Anything outside this set is
    /// rejected before it reaches a handler.
    #[derive(Deserialize, Debug, Clone, Copy, Default)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum BookingState {
        #[default]
        All,
        Current,
        Past,
        Future,
        Waiting,
        Rejected,
    }

    impl From<BookingState> for entities::BookingState {
        fn from(state: BookingState) -> Self {
            match state {
                BookingState::All => entities::BookingState::All,
                BookingState::Current => entities::BookingState::Current,
                BookingState::Past => entities::BookingState::Past,
                BookingState::Future => entities::BookingState::Future,
                BookingState::Waiting => entities::BookingState::Waiting,
                BookingState::Rejected => entities::BookingState::Rejected,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum BookingStatus {
        Waiting,
        Approved,
        Rejected,
    }

    impl From<entities::BookingStatus> for BookingStatus {
        fn from(status: entities::BookingStatus) -> Self {
            match status {
                entities::BookingStatus::Waiting => BookingStatus::Waiting,
                entities::BookingStatus::Approved => BookingStatus::Approved,
                entities::BookingStatus::Rejected => BookingStatus::Rejected,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Booking {
        pub id: i64,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        pub status: BookingStatus,
        pub item_id: i64,
        pub booker_id: i64,
    }

    impl From<entities::Booking> for Booking {
        fn from(booking: entities::Booking) -> Self {
            Booking {
                id: booking.id,
                start: booking.start_date,
                end: booking.end_date,
                status: booking.status.into(),
                item_id: booking.item_id,
                booker_id: booking.booker_id,
            }
        }
    }
}
