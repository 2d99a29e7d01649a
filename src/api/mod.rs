use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use std::str::FromStr;

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

const X_SHARER_USER_ID: &str = "X-Sharer-User-Id";

/// The id of the user acting on the request, taken from the
/// `X-Sharer-User-Id` header the gateway sets.
#[derive(Debug)]
pub struct ExtractUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        if let Some(user_id) = parts.headers.get(X_SHARER_USER_ID) {
            let user_id = user_id
                .to_str()
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
            let user_id = i64::from_str(user_id)
                .map_err(|_| (StatusCode::BAD_REQUEST, "invalid user id"))?;
            Ok(ExtractUser(user_id))
        } else {
            Err((
                StatusCode::BAD_REQUEST,
                "`X-Sharer-User-Id` header is missing",
            ))
        }
    }
}
