//! Access token extraction and validation for the JSON API.

use crate::AppResources;
use crate::error::ApiError;
use crate::oauth2::cookies;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use std::convert::Infallible;

/// The caller's access token, taken from the `access_token` cookie or an
/// `Authorization: Bearer` header, in that order.
#[derive(Debug, Clone)]
pub struct AccessToken(pub Option<String>);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(token) = cookies::value(&jar, cookies::ACCESS_TOKEN) {
            return Ok(AccessToken(Some(token)));
        }

        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Ok(AccessToken(bearer))
    }
}

/// Introspect `token` and return the user id it was issued for.
pub async fn authenticated_user_id(
    state: &AppResources,
    token: Option<String>,
) -> Result<u32, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("Access Token is not present."))?;

    let introspection = state
        .hydra
        .introspect_token(&token)
        .await
        .map_err(ApiError::internal)?;

    if !introspection.active {
        return Err(ApiError::unauthorized("Access Token is not active."));
    }

    let subject = introspection
        .sub
        .ok_or_else(|| ApiError::unauthorized("The token has no subject."))?;

    subject
        .parse::<u32>()
        .map_err(|_| ApiError::bad_request("The token's subject user id is in a bad format."))
}
