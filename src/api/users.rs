//! User endpoints
//!
//! These are not gated by `X-Sharer-User-Id`; the gateway exposes them
//! as plain account administration.

use crate::api::users::schemas::{CreateUser, UpdateUser};
use crate::core::traits::UserService;
use crate::error::AppError;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_all_users).post(create_user))
        .route(
            "/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

async fn get_all_users(
    Inject(user_service): Inject<dyn UserService>,
) -> Result<Json<Vec<schemas::User>>, AppError> {
    debug!("get all users");
    let users = user_service.get_all_users().await?;
    Ok(Json(users.into_iter().map(schemas::User::from).collect()))
}

async fn get_user(
    Inject(user_service): Inject<dyn UserService>,
    Path(user_id): Path<i64>,
) -> Result<Json<schemas::User>, AppError> {
    debug!("get user {}", user_id);
    let user = user_service.get_user(user_id).await?;
    Ok(Json(user.into()))
}

async fn create_user(
    Inject(user_service): Inject<dyn UserService>,
    Json(create_user): Json<CreateUser>,
) -> Result<Json<schemas::User>, AppError> {
    debug!("create user");
    let user = user_service
        .create_user(create_user.name, create_user.email)
        .await?;
    Ok(Json(user.into()))
}

async fn update_user(
    Inject(user_service): Inject<dyn UserService>,
    Path(user_id): Path<i64>,
    Json(update_user): Json<UpdateUser>,
) -> Result<Json<schemas::User>, AppError> {
    debug!("update user {}", user_id);
    let user = user_service
        .update_user(user_id, update_user.name, update_user.email)
        .await?;
    Ok(Json(user.into()))
}

async fn delete_user(
    Inject(user_service): Inject<dyn UserService>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("delete user {}", user_id);
    user_service.delete_user(user_id).await?;
    Ok(StatusCode::OK)
}

pub mod schemas {
    use crate::infrastructure::entities;
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug)]
    pub struct CreateUser {
        pub name: String,
        pub email: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct UpdateUser {
        pub name: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct User {
        pub id: i64,
        pub name: String,
        pub email: String,
    }

    impl From<entities::User> for User {
        fn from(user: entities::User) -> Self {
            User {
                id: user.id,
                name: user.name,
                email: user.email,
            }
        }
    }
}
