//! Account API: `/api/v1/users`.

use crate::AppResources;
use crate::api::auth::{AccessToken, authenticated_user_id};
use crate::entity::user;
use crate::error::ApiError;
use crate::service::UserError;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// OpenAPI tag for the account API.
pub const USERS_TAG: &str = "Users";

/// Public view of a user row. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: u32,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_registration: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_last_online: OffsetDateTime,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id.unsigned_abs(),
            username: model.username,
            email: model.email,
            date_registration: model.date_registration,
            date_last_online: model.date_last_online,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: UserInfo,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new().routes(routes!(get_user))
}

/// Get a user by id.
#[tracing::instrument(skip(state, token))]
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = USERS_TAG,
    operation_id = "Get User",
    summary = "Get the profile of the signed-in user",
    description = "Returns the profile of the user `id`. The access token must be active and issued for \
                   that same user.",
    params(
        ("id" = u32, Path, description = "User id"),
    ),
    security(
        ("AccessToken" = []),
        ("Authorization" = []),
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Malformed user id or token subject", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or inactive access token", body = crate::error::ErrorBody),
        (status = 403, description = "Token issued for another user", body = crate::error::ErrorBody),
        (status = 404, description = "User not found", body = crate::error::ErrorBody),
        (status = 500, description = "OAuth2 provider or database error", body = crate::error::ErrorBody),
    )
)]
async fn get_user(
    State(state): State<AppResources>,
    Path(id): Path<String>,
    AccessToken(token): AccessToken,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id: u32 = id
        .parse()
        .map_err(|_| ApiError::bad_request("User id is in a bad format."))?;

    let subject = authenticated_user_id(&state, token).await?;
    if subject != user_id {
        return Err(ApiError::forbidden("No permission."));
    }

    // Ids above i32::MAX can not exist in the table.
    let row_id = i32::try_from(user_id).map_err(|_| ApiError::not_found("User not found."))?;
    let user = state
        .users
        .get_user_by_id(row_id)
        .await
        .map_err(|err| match err {
            UserError::NotFound => ApiError::not_found("User not found."),
            other => ApiError::internal(other),
        })?;

    Ok(Json(UserResponse { user: user.into() }))
}
