//! Consent challenge: `GET /consent` and `POST /consent`.

use super::{SUBMIT_ALLOW_ACCESS, SUBMIT_DENY_ACCESS, render, require_challenge};
use crate::AppResources;
use crate::error::FlowError;
use crate::hydra::{AcceptConsentRequest, ConsentRequestSession, RejectRequest};
use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const PATH_CONSENT: &str = "/consent";

#[derive(Template)]
#[template(path = "consent.html")]
struct ConsentTemplate {
    action: &'static str,
    challenge: String,
    requested_scope: Vec<String>,
    user: String,
    client_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConsentQuery {
    /// Consent challenge issued by the provider.
    pub consent_challenge: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsentForm {
    pub challenge: Option<String>,
    #[serde(default)]
    pub submit: String,
    /// One entry per checked scope; the key repeats.
    #[serde(default)]
    pub grant_scope: Vec<String>,
    #[serde(default)]
    pub remember: String,
}

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new().routes(routes!(consent_page, consent_submit))
}

#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/consent",
    tag = super::OAUTH2_TAG,
    operation_id = "Consent Page",
    summary = "Handle a consent challenge",
    description = "Fetches the consent request from the provider. If the user granted these scopes to the client \
                   before, the request is accepted with the requested scopes and audience; otherwise the consent \
                   form is shown.",
    params(ConsentQuery),
    responses(
        (status = 200, description = "Consent page HTML"),
        (status = 303, description = "Consent accepted, redirect back to the provider"),
        (status = 400, description = "Missing consent challenge"),
        (status = 500, description = "OAuth2 provider error"),
    )
)]
async fn consent_page(
    State(state): State<AppResources>,
    Query(query): Query<ConsentQuery>,
) -> Result<Response, FlowError> {
    let challenge = require_challenge(query.consent_challenge, "consent")?;
    let consent = state.hydra.get_consent_request(&challenge).await?;

    if consent.skip {
        let redirect_to = state
            .hydra
            .accept_consent_request(
                &challenge,
                &AcceptConsentRequest {
                    grant_scope: consent.requested_scope,
                    grant_access_token_audience: consent.requested_access_token_audience,
                    remember: true,
                    remember_for: state.config.oauth2.remember_for,
                    session: ConsentRequestSession::default(),
                },
            )
            .await?;
        return Ok(Redirect::to(&redirect_to).into_response());
    }

    let template = ConsentTemplate {
        action: PATH_CONSENT,
        client_name: consent.client.display_name().to_string(),
        challenge,
        requested_scope: consent.requested_scope,
        user: consent.subject,
    };
    Ok(render(&template)?.into_response())
}

#[tracing::instrument(skip(state, form), fields(submit = %form.submit))]
#[utoipa::path(
    post,
    path = "/consent",
    tag = super::OAUTH2_TAG,
    operation_id = "Consent Submit",
    summary = "Grant or deny a consent challenge",
    description = "`Deny access` rejects the consent request. `Allow access` accepts it with the checked \
                   `grant_scope` values and the audience the client asked for.",
    request_body(
        content = ConsentForm,
        content_type = "application/x-www-form-urlencoded",
    ),
    responses(
        (status = 303, description = "Redirect back to the provider"),
        (status = 400, description = "Missing challenge or unexpected submit"),
        (status = 500, description = "OAuth2 provider error"),
    )
)]
async fn consent_submit(
    State(state): State<AppResources>,
    Form(form): Form<ConsentForm>,
) -> Result<Response, FlowError> {
    let challenge = require_challenge(form.challenge, "consent")?;

    if form.submit == SUBMIT_DENY_ACCESS {
        let redirect_to = state
            .hydra
            .reject_consent_request(&challenge, &RejectRequest::access_denied())
            .await?;
        return Ok(Redirect::to(&redirect_to).into_response());
    }
    if form.submit != SUBMIT_ALLOW_ACCESS {
        return Err(FlowError::bad_request("Unexpected submit!"));
    }

    let consent = state.hydra.get_consent_request(&challenge).await?;

    let redirect_to = state
        .hydra
        .accept_consent_request(
            &challenge,
            &AcceptConsentRequest {
                grant_scope: form.grant_scope,
                grant_access_token_audience: consent.requested_access_token_audience,
                remember: !form.remember.is_empty(),
                remember_for: state.config.oauth2.remember_for,
                session: ConsentRequestSession::default(),
            },
        )
        .await?;

    tracing::info!(subject = %consent.subject, "Consent granted");
    Ok(Redirect::to(&redirect_to).into_response())
}
