//! Login challenge: `GET /signin` and `POST /signin`.

use super::{SUBMIT_DENY_ACCESS, SUBMIT_LOG_IN, render, require_challenge};
use crate::AppResources;
use crate::error::FlowError;
use crate::hydra::{AcceptLoginRequest, RejectRequest};
use crate::service::{SignInInput, UserError};
use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const PATH_SIGNIN: &str = "/signin";

#[derive(Template)]
#[template(path = "signin.html")]
struct SignInTemplate {
    action: &'static str,
    challenge: String,
    email: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SignInQuery {
    /// Login challenge issued by the provider.
    pub login_challenge: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInForm {
    pub challenge: Option<String>,
    #[serde(default)]
    pub submit: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Any non-empty value keeps the login session.
    #[serde(default)]
    pub remember: String,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new().routes(routes!(signin_page, signin_submit))
}

/// Display the sign-in form, or skip it when the provider already knows the user.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/signin",
    tag = super::OAUTH2_TAG,
    operation_id = "Sign In Page",
    summary = "Handle a login challenge",
    description = "Fetches the login request from the provider. When the provider reports that the user is \
                   already authenticated, the request is accepted right away; otherwise the sign-in form is shown.",
    params(SignInQuery),
    responses(
        (status = 200, description = "Sign-in page HTML"),
        (status = 303, description = "Login accepted, redirect back to the provider"),
        (status = 400, description = "Missing login challenge"),
        (status = 500, description = "OAuth2 provider error"),
    )
)]
async fn signin_page(
    State(state): State<AppResources>,
    Query(query): Query<SignInQuery>,
) -> Result<Response, FlowError> {
    let challenge = require_challenge(query.login_challenge, "login")?;
    let login = state.hydra.get_login_request(&challenge).await?;

    if login.skip {
        // The provider authenticated this user before; nothing to ask.
        let redirect_to = state
            .hydra
            .accept_login_request(
                &challenge,
                &AcceptLoginRequest {
                    subject: login.subject,
                    remember: true,
                    remember_for: state.config.oauth2.remember_for,
                },
            )
            .await?;
        return Ok(Redirect::to(&redirect_to).into_response());
    }

    let template = SignInTemplate {
        action: PATH_SIGNIN,
        email: login.login_hint().to_string(),
        challenge,
        error: None,
    };
    Ok(render(&template)?.into_response())
}

/// Check the submitted credentials and accept or reject the login challenge.
#[tracing::instrument(skip(state, form), fields(email = %form.email, submit = %form.submit))]
#[utoipa::path(
    post,
    path = "/signin",
    tag = super::OAUTH2_TAG,
    operation_id = "Sign In Submit",
    summary = "Submit credentials for a login challenge",
    description = "`Deny access` rejects the login request. `Log in` verifies the email and password and \
                   accepts the login request with the user id as subject.",
    request_body(
        content = SignInForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 303, description = "Redirect back to the provider"),
        (status = 400, description = "Missing challenge, unexpected submit or invalid credentials"),
        (status = 500, description = "OAuth2 provider or database error"),
    )
)]
async fn signin_submit(
    State(state): State<AppResources>,
    Form(form): Form<SignInForm>,
) -> Result<Response, FlowError> {
    let challenge = require_challenge(form.challenge, "login")?;

    if form.submit == SUBMIT_DENY_ACCESS {
        let redirect_to = state
            .hydra
            .reject_login_request(&challenge, &RejectRequest::access_denied())
            .await?;
        return Ok(Redirect::to(&redirect_to).into_response());
    }
    if form.submit != SUBMIT_LOG_IN {
        return Err(FlowError::bad_request("Unexpected submit!"));
    }

    let user = match state
        .users
        .sign_in(SignInInput {
            email: form.email.clone(),
            password: form.password,
        })
        .await
    {
        Ok(user) => user,
        Err(err) => {
            let (status, message) = match err {
                UserError::NotFound | UserError::PasswordIncorrect => {
                    tracing::info!("Rejected sign-in with invalid credentials");
                    (StatusCode::BAD_REQUEST, "Invalid email or password")
                }
                other => {
                    tracing::error!(error = %other, "Sign-in failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An error occurred. Please try again.",
                    )
                }
            };
            let template = SignInTemplate {
                action: PATH_SIGNIN,
                challenge,
                email: form.email,
                error: Some(message.to_string()),
            };
            return Ok((status, render(&template)?).into_response());
        }
    };

    // The challenge may have expired while the user was typing.
    state.hydra.get_login_request(&challenge).await?;

    let redirect_to = state
        .hydra
        .accept_login_request(
            &challenge,
            &AcceptLoginRequest {
                subject: user.subject(),
                remember: !form.remember.is_empty(),
                remember_for: state.config.oauth2.remember_for,
            },
        )
        .await?;

    tracing::info!(user_id = user.id, "User signed in");
    Ok(Redirect::to(&redirect_to).into_response())
}
