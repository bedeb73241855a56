//! Account registration: `GET /signup` and `POST /signup`.

use super::{SUBMIT_REGISTER, render};
use crate::AppResources;
use crate::error::{ApiError, FlowError};
use crate::service::{SignUpInput, UserError};
use askama::Template;
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

pub const PATH_SIGNUP: &str = "/signup";

#[derive(Template)]
#[template(path = "signup.html")]
struct SignUpTemplate {
    action: &'static str,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpForm {
    #[serde(default)]
    pub submit: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Answer of a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    /// Where the browser should go next.
    pub redirect_url: String,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new().routes(routes!(signup_page, signup_submit))
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn validate(form: &SignUpForm) -> Result<(), ApiError> {
    if form.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username must not be empty"));
    }
    if form.password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }
    if !is_valid_email(form.email.trim()) {
        return Err(ApiError::bad_request("Please enter a valid email address"));
    }
    Ok(())
}

#[tracing::instrument()]
#[utoipa::path(
    get,
    path = "/signup",
    tag = super::OAUTH2_TAG,
    operation_id = "Sign Up Page",
    summary = "Display the registration form",
    responses(
        (status = 200, description = "Registration page HTML"),
    )
)]
async fn signup_page() -> Result<Response, FlowError> {
    Ok(render(&SignUpTemplate {
        action: PATH_SIGNUP,
    })?
    .into_response())
}

/// Register a new account.
#[tracing::instrument(skip(state, form), fields(email = %form.email))]
#[utoipa::path(
    post,
    path = "/signup",
    tag = super::OAUTH2_TAG,
    operation_id = "Sign Up Submit",
    summary = "Register a new account",
    description = "Creates the account and answers with the URL the page should navigate to.",
    request_body(
        content = SignUpForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 201, description = "Account created", body = SignUpResponse),
        (status = 400, description = "Unexpected submit, invalid input or email already registered", body = crate::error::ErrorBody),
        (status = 500, description = "Database error", body = crate::error::ErrorBody),
    )
)]
async fn signup_submit(
    State(state): State<AppResources>,
    Form(form): Form<SignUpForm>,
) -> Result<Response, ApiError> {
    if form.submit != SUBMIT_REGISTER {
        return Err(ApiError::bad_request("Unexpected submit!"));
    }
    validate(&form)?;

    match state
        .users
        .sign_up(SignUpInput {
            username: form.username,
            email: form.email,
            password: form.password,
        })
        .await
    {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(SignUpResponse {
                redirect_url: "/".to_string(),
            }),
        )
            .into_response()),
        Err(UserError::AlreadyExists) => Err(ApiError::bad_request("User already exists")),
        Err(other) => Err(ApiError::internal(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("alice@@example.com"));
        assert!(!is_valid_email("alice@example.com."));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let form = SignUpForm {
            submit: SUBMIT_REGISTER.into(),
            username: " ".into(),
            email: "alice@example.com".into(),
            password: "pw".into(),
        };
        assert_eq!(validate(&form).unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
