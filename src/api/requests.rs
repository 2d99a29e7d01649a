//! Item request endpoints

use crate::api::ExtractUser;
use crate::api::requests::schemas::CreateRequest;
use crate::core::traits::RequestService;
use crate::error::AppError;
use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_own_requests).post(create_request))
        .route("/all", get(list_other_requests))
        .route("/:request_id", get(get_request))
}

async fn create_request(
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
    Json(create_request): Json<CreateRequest>,
) -> Result<Json<schemas::ItemRequest>, AppError> {
    debug!("create item request by user {}", current_user);
    let request = request_service
        .create_request(current_user, create_request.description)
        .await?;
    Ok(Json(request.into()))
}

async fn list_own_requests(
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<Vec<schemas::ItemRequest>>, AppError> {
    debug!("list item requests of user {}", current_user);
    let requests = request_service.list_own_requests(current_user).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(schemas::ItemRequest::from)
            .collect(),
    ))
}

async fn list_other_requests(
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<Vec<schemas::ItemRequest>>, AppError> {
    debug!("list item requests of users other than {}", current_user);
    let requests = request_service.list_other_requests(current_user).await?;
    Ok(Json(
        requests
            .into_iter()
            .map(schemas::ItemRequest::from)
            .collect(),
    ))
}

async fn get_request(
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
    Path(request_id): Path<i64>,
) -> Result<Json<schemas::ItemRequest>, AppError> {
    debug!("get item request {} for user {}", request_id, current_user);
    let request = request_service.get_request(request_id).await?;
    Ok(Json(request.into()))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    pub struct CreateRequest {
        pub description: String,
    }

    /// An item listed in response to a request.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct RespondingItem {
        pub id: i64,
        pub name: String,
        pub owner_id: i64,
    }

    impl From<entities::Item> for RespondingItem {
        fn from(item: entities::Item) -> Self {
            RespondingItem {
                id: item.id,
                name: item.name,
                owner_id: item.owner_id,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ItemRequest {
        pub id: i64,
        pub description: String,
        pub created: DateTime<Utc>,
        pub items: Vec<RespondingItem>,
    }

    impl From<entities::ItemRequest> for ItemRequest {
        fn from(request: entities::ItemRequest) -> Self {
            ItemRequest {
                id: request.id,
                description: request.description,
                created: request.created,
                items: Vec::new(),
            }
        }
    }

    impl From<entities::RequestWithItems> for ItemRequest {
        fn from(request: entities::RequestWithItems) -> Self {
            ItemRequest {
                id: request.request.id,
                description: request.request.description,
                created: request.request.created,
                items: request
                    .items
                    .into_iter()
                    .map(RespondingItem::from)
                    .collect(),
            }
        }
    }
}
