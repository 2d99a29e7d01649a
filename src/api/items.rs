//! Item endpoints

use crate::api::ExtractUser;
use crate::api::items::schemas::{CreateComment, CreateItem, SearchParams, UpdateItem};
use crate::core::traits::ItemService;
use crate::error::AppError;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route(
            "/:item_id",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/:item_id/comment", post(add_comment))
}

async fn list_items(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<Vec<schemas::ItemDetails>>, AppError> {
    debug!("list items of owner {}", current_user);
    let overviews = item_service.list_for_owner(current_user).await?;
    Ok(Json(
        overviews
            .into_iter()
            .map(schemas::ItemDetails::from)
            .collect(),
    ))
}

async fn create_item(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Json(create_item): Json<CreateItem>,
) -> Result<Json<schemas::Item>, AppError> {
    debug!("create item for owner {}", current_user);
    let item = item_service
        .create_item(
            current_user,
            create_item.name,
            create_item.description,
            create_item.available,
            create_item.request_id,
        )
        .await?;
    Ok(Json(item.into()))
}

async fn get_item(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Path(item_id): Path<i64>,
) -> Result<Json<schemas::ItemDetails>, AppError> {
    debug!("get item {} for user {}", item_id, current_user);
    let overview = item_service.get_item(item_id).await?;
    Ok(Json(overview.into()))
}

async fn update_item(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Path(item_id): Path<i64>,
    Json(update_item): Json<UpdateItem>,
) -> Result<Json<schemas::Item>, AppError> {
    debug!("update item {} by user {}", item_id, current_user);
    let item = item_service
        .update_item(
            current_user,
            item_id,
            update_item.name,
            update_item.description,
            update_item.available,
        )
        .await?;
    Ok(Json(item.into()))
}

async fn delete_item(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Path(item_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("delete item {} by user {}", item_id, current_user);
    item_service.delete_item(current_user, item_id).await?;
    Ok(StatusCode::OK)
}

async fn search_items(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<schemas::Item>>, AppError> {
    debug!("search items for {:?} by user {}", params.text, current_user);
    let items = item_service.search_items(&params.text).await?;
    Ok(Json(items.into_iter().map(schemas::Item::from).collect()))
}

async fn add_comment(
    Inject(item_service): Inject<dyn ItemService>,
    ExtractUser(current_user): ExtractUser,
    Path(item_id): Path<i64>,
    Json(create_comment): Json<CreateComment>,
) -> Result<Json<schemas::Comment>, AppError> {
    debug!("comment on item {} by user {}", item_id, current_user);
    let comment = item_service
        .add_comment(current_user, item_id, create_comment.text)
        .await?;
    Ok(Json(comment.into()))
}

pub mod schemas {
    use crate::api::bookings::schemas::Booking;
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateItem {
        pub name: String,
        pub description: String,
        pub available: bool,
        pub request_id: Option<i64>,
    }

    #[derive(Deserialize, Debug)]
    pub struct UpdateItem {
        pub name: Option<String>,
        pub description: Option<String>,
        pub available: Option<bool>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SearchParams {
        pub text: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateComment {
        pub text: String,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Item {
        pub id: i64,
        pub name: String,
        pub description: String,
        pub available: bool,
        pub owner_id: i64,
        pub request_id: Option<i64>,
    }

    impl From<entities::Item> for Item {
        fn from(item: entities::Item) -> Self {
            Item {
                id: item.id,
                name: item.name,
                description: item.description,
                available: item.available,
                owner_id: item.owner_id,
                request_id: item.request_id,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Comment {
        pub id: i64,
        pub text: String,
        pub author_name: String,
        pub created: DateTime<Utc>,
    }

    impl From<entities::CommentWithAuthor> for Comment {
        fn from(comment: entities::CommentWithAuthor) -> Self {
            Comment {
                id: comment.id,
                text: comment.text,
                author_name: comment.author_name,
                created: comment.created,
            }
        }
    }

    /// An item as its owner sees it, with the booking outlook and the
    /// comments renters left.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemDetails {
        pub id: i64,
        pub name: String,
        pub description: String,
        pub available: bool,
        pub request_id: Option<i64>,
        pub last_booking: Option<Booking>,
        pub next_booking: Option<Booking>,
        pub comments: Vec<Comment>,
    }

    impl From<entities::ItemOverview> for ItemDetails {
        fn from(overview: entities::ItemOverview) -> Self {
            ItemDetails {
                id: overview.item.id,
                name: overview.item.name,
                description: overview.item.description,
                available: overview.item.available,
                request_id: overview.item.request_id,
                last_booking: overview.last_booking.map(Booking::from),
                next_booking: overview.next_booking.map(Booking::from),
                comments: overview.comments.into_iter().map(Comment::from).collect(),
            }
        }
    }
}
