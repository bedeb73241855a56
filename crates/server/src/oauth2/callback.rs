//! Home page and authorization code callback.

use super::{STATE_LENGTH, cookies, links, random_alpha_lower, render};
use crate::AppResources;
use crate::error::FlowError;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    is_auth: bool,
    /// Logout URL when signed in, sign-in URL otherwise.
    url: String,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    name: String,
    description: String,
    hint: String,
    debug: String,
}

impl ErrorTemplate {
    fn message(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            hint: String::new(),
            debug: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub error_hint: Option<String>,
    pub error_debug: Option<String>,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new()
        .routes(routes!(home))
        .routes(routes!(callback))
}

/// Home page: a logout link when the access token cookie is still active,
/// a fresh sign-in link otherwise.
#[tracing::instrument(skip(state, jar))]
#[utoipa::path(
    get,
    path = "/",
    tag = super::OAUTH2_TAG,
    operation_id = "Home",
    summary = "Home page",
    responses(
        (status = 200, description = "Home page HTML"),
        (status = 500, description = "Token introspection failed"),
    )
)]
async fn home(State(state): State<AppResources>, jar: CookieJar) -> Result<Response, FlowError> {
    if let Some(access_token) = cookies::value(&jar, cookies::ACCESS_TOKEN) {
        let introspection = state.hydra.introspect_token(&access_token).await?;
        if introspection.active {
            match cookies::value(&jar, cookies::ID_TOKEN) {
                Some(id_token) => {
                    let url = links::logout_url(&state.config, &id_token, "", "")?;
                    return Ok(render(&IndexTemplate { is_auth: true, url })?.into_response());
                }
                None => tracing::warn!("Active access token without an id_token cookie"),
            }
        }
    }

    let auth_state = random_alpha_lower(STATE_LENGTH)?;
    let nonce = random_alpha_lower(STATE_LENGTH)?;
    let url = links::auth_code_url(&state.config, &auth_state, &nonce)?;
    let jar = cookies::store_state(jar, auth_state);

    Ok((jar, render(&IndexTemplate { is_auth: false, url })?).into_response())
}

/// Where the provider sends the browser with the authorization code.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get,
    path = "/callback",
    tag = super::OAUTH2_TAG,
    operation_id = "OAuth2 Callback",
    summary = "Exchange the authorization code for tokens",
    description = "Checks `state` against the value issued with the sign-in link, exchanges `code` at the \
                   token endpoint and stores the tokens in HTTP-only cookies. Provider errors are shown on \
                   an error page.",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Error page HTML for a provider-reported error"),
        (status = 303, description = "Tokens stored, redirect to the home page"),
        (status = 400, description = "Error page HTML for a missing or mismatching state"),
        (status = 500, description = "Error page HTML for a failed code exchange"),
    )
)]
async fn callback(
    State(state): State<AppResources>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, FlowError> {
    if let Some(name) = query.error.filter(|e| !e.is_empty()) {
        tracing::warn!(error = %name, "Provider reported an error");
        let page = ErrorTemplate {
            name,
            description: query.error_description.unwrap_or_default(),
            hint: query.error_hint.unwrap_or_default(),
            debug: query.error_debug.unwrap_or_default(),
        };
        return Ok(render(&page)?.into_response());
    }

    let (jar, expected_state) = cookies::take_state(jar);
    let state_matches = matches!(
        (&expected_state, &query.state),
        (Some(expected), Some(got)) if !expected.is_empty() && expected == got
    );
    if !state_matches {
        tracing::warn!("Callback state does not match the issued state");
        let page = ErrorTemplate::message("Invalid state parameter");
        return Ok((StatusCode::BAD_REQUEST, jar, render(&page)?).into_response());
    }

    let code = query.code.unwrap_or_default();
    let tokens = match state.hydra.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::error!(error = %err, "Unable to exchange code for token");
            let page = ErrorTemplate::message(err.to_string());
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, jar, render(&page)?).into_response());
        }
    };

    tracing::debug!(expiry = ?tokens.expiry, "Received tokens");
    let jar = cookies::store_tokens(jar, &tokens);
    Ok((jar, Redirect::to("/")).into_response())
}
