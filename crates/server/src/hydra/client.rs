use super::models::{GenericError, TokenResponse};
use super::{
    AcceptConsentRequest, AcceptLoginRequest, CompletedRequest, ConsentRequest, HydraAdmin,
    HydraError, LoginRequest, RejectRequest, TokenIntrospection, TokenSet,
};
use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use time::OffsetDateTime;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const LOGIN_PATH: &str = "/oauth2/auth/requests/login";
const CONSENT_PATH: &str = "/oauth2/auth/requests/consent";
const LOGOUT_PATH: &str = "/oauth2/auth/requests/logout";
const INTROSPECT_PATH: &str = "/oauth2/introspect";

/// [`HydraAdmin`] over HTTP.
#[derive(Clone)]
pub struct HydraClient {
    http: Client,
    admin_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

impl std::fmt::Debug for HydraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraClient")
            .field("admin_url", &self.admin_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl HydraClient {
    pub fn new(config: &AppConfig) -> Result<Self, HydraError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            admin_url: config.oauth2.admin_url(),
            token_url: config.oauth2.token_url(),
            client_id: config.oauth2.client_id.clone(),
            client_secret: config.oauth2.client_secret.clone(),
            callback_url: config.callback_url(),
        })
    }

    fn admin(&self, path: &str) -> String {
        format!("{}{}", self.admin_url, path)
    }

    async fn get_challenge<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: &str,
        challenge: &str,
    ) -> Result<T, HydraError> {
        let req = self
            .http
            .get(self.admin(path))
            .query(&[(format!("{kind}_challenge"), challenge)]);
        read_json(send(req).await?).await
    }

    async fn put_challenge<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        kind: &str,
        challenge: &str,
        body: &B,
    ) -> Result<String, HydraError> {
        let req = self
            .http
            .put(self.admin(path))
            .query(&[(format!("{kind}_challenge"), challenge)])
            .json(body);
        let completed: CompletedRequest = read_json(send(req).await?).await?;
        Ok(completed.redirect_to)
    }
}

async fn send(req: RequestBuilder) -> Result<Response, HydraError> {
    let response = req.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GenericError>(&body)
        .ok()
        .and_then(GenericError::describe)
        .unwrap_or(body);
    tracing::debug!(%status, %message, "OAuth2 provider returned an error");
    Err(HydraError::Api { status, message })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, HydraError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| HydraError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl HydraAdmin for HydraClient {
    #[tracing::instrument(skip(self))]
    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, HydraError> {
        self.get_challenge(LOGIN_PATH, "login", challenge).await
    }

    #[tracing::instrument(skip(self, body), fields(subject = %body.subject))]
    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<String, HydraError> {
        self.put_challenge(&format!("{LOGIN_PATH}/accept"), "login", challenge, body)
            .await
    }

    #[tracing::instrument(skip(self, body))]
    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<String, HydraError> {
        self.put_challenge(&format!("{LOGIN_PATH}/reject"), "login", challenge, body)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, HydraError> {
        self.get_challenge(CONSENT_PATH, "consent", challenge).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<String, HydraError> {
        self.put_challenge(&format!("{CONSENT_PATH}/accept"), "consent", challenge, body)
            .await
    }

    #[tracing::instrument(skip(self, body))]
    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<String, HydraError> {
        self.put_challenge(&format!("{CONSENT_PATH}/reject"), "consent", challenge, body)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn accept_logout_request(&self, challenge: &str) -> Result<String, HydraError> {
        let req = self
            .http
            .put(self.admin(&format!("{LOGOUT_PATH}/accept")))
            .query(&[("logout_challenge", challenge)]);
        let completed: CompletedRequest = read_json(send(req).await?).await?;
        Ok(completed.redirect_to)
    }

    #[tracing::instrument(skip(self))]
    async fn reject_logout_request(&self, challenge: &str) -> Result<(), HydraError> {
        let req = self
            .http
            .put(self.admin(&format!("{LOGOUT_PATH}/reject")))
            .query(&[("logout_challenge", challenge)]);
        // 204 No Content
        send(req).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn introspect_token(&self, token: &str) -> Result<TokenIntrospection, HydraError> {
        let req = self
            .http
            .post(self.admin(INTROSPECT_PATH))
            .form(&[("token", token)]);
        read_json(send(req).await?).await
    }

    #[tracing::instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, HydraError> {
        let req = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ]);
        let resp: TokenResponse = read_json(send(req).await?).await?;
        Ok(TokenSet::from_response(resp, OffsetDateTime::now_utc()))
    }
}
