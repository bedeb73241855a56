//! Logout challenge and the provider's logout notifications.

use super::{SUBMIT_NO, SUBMIT_YES, cookies, render, require_challenge};
use crate::AppResources;
use crate::error::FlowError;
use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const PATH_LOGOUT: &str = "/logout";

#[derive(Template)]
#[template(path = "logout.html")]
struct LogoutTemplate {
    action: &'static str,
    challenge: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogoutQuery {
    /// Logout challenge issued by the provider.
    pub logout_challenge: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutForm {
    pub challenge: Option<String>,
    #[serde(default)]
    pub submit: String,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new()
        .routes(routes!(logout_page, logout_submit))
        .routes(routes!(backchannel_logout))
        .routes(routes!(frontchannel_logout))
}

#[tracing::instrument()]
#[utoipa::path(
    get,
    path = "/logout",
    tag = super::OAUTH2_TAG,
    operation_id = "Logout Page",
    summary = "Ask the user to confirm a logout challenge",
    params(LogoutQuery),
    responses(
        (status = 200, description = "Logout confirmation HTML"),
        (status = 400, description = "Missing logout challenge"),
    )
)]
async fn logout_page(Query(query): Query<LogoutQuery>) -> Result<Response, FlowError> {
    let challenge = require_challenge(query.logout_challenge, "logout")?;
    Ok(render(&LogoutTemplate {
        action: PATH_LOGOUT,
        challenge,
    })?
    .into_response())
}

#[tracing::instrument(skip(state, form), fields(submit = %form.submit))]
#[utoipa::path(
    post,
    path = "/logout",
    tag = super::OAUTH2_TAG,
    operation_id = "Logout Submit",
    summary = "Confirm or cancel a logout challenge",
    description = "`No` rejects the logout request and returns to the home page. `Yes` accepts it and \
                   follows the provider's redirect.",
    request_body(
        content = LogoutForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 303, description = "Redirect to the provider or the home page"),
        (status = 400, description = "Missing challenge or unexpected submit"),
        (status = 500, description = "OAuth2 provider error"),
    )
)]
async fn logout_submit(
    State(state): State<AppResources>,
    Form(form): Form<LogoutForm>,
) -> Result<Response, FlowError> {
    let challenge = require_challenge(form.challenge, "logout")?;

    match form.submit.as_str() {
        SUBMIT_NO => {
            state.hydra.reject_logout_request(&challenge).await?;
            Ok(Redirect::to("/").into_response())
        }
        SUBMIT_YES => {
            let redirect_to = state.hydra.accept_logout_request(&challenge).await?;
            Ok(Redirect::to(&redirect_to).into_response())
        }
        _ => Err(FlowError::bad_request("Unexpected submit!")),
    }
}

/// Back-channel logout notification. Sessions live in browser cookies only,
/// so there is nothing to revoke server-side.
#[tracing::instrument()]
#[utoipa::path(
    method(get, post),
    path = "/backchannel-logout",
    tag = super::OAUTH2_TAG,
    operation_id = "Backchannel Logout",
    summary = "Receive a back-channel logout notification",
    responses(
        (status = 200, description = "Notification acknowledged"),
    )
)]
async fn backchannel_logout() -> StatusCode {
    StatusCode::OK
}

/// Front-channel logout: the provider loads this in the browser to drop our cookies.
#[tracing::instrument(skip(jar))]
#[utoipa::path(
    get,
    path = "/frontchannel-logout",
    tag = super::OAUTH2_TAG,
    operation_id = "Frontchannel Logout",
    summary = "Expire the token cookies",
    responses(
        (status = 200, description = "Cookies expired"),
    )
)]
async fn frontchannel_logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (cookies::clear_tokens(jar), StatusCode::OK)
}
