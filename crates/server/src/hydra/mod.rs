//! Client for the OAuth2/OpenID Connect provider (ORY Hydra admin API v1).
//!
//! Every login, consent and logout challenge is relayed to the provider, which
//! answers with the URL the browser has to be sent to next.

mod client;
pub mod models;

pub use client::HydraClient;
pub use models::{
    AcceptConsentRequest, AcceptLoginRequest, CompletedRequest, ConsentRequest,
    ConsentRequestSession, LoginRequest, OAuth2Client, OidcContext, RejectRequest,
    TokenIntrospection, TokenSet,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HydraError {
    #[error("Request to OAuth2 provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("OAuth2 provider returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("Invalid response from OAuth2 provider: {0}")]
    InvalidResponse(String),
}

/// Operations on the provider used by the login, consent and logout flows.
#[async_trait]
pub trait HydraAdmin: Send + Sync {
    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, HydraError>;

    /// Returns the URL the browser must be redirected to.
    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<String, HydraError>;

    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<String, HydraError>;

    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, HydraError>;

    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<String, HydraError>;

    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<String, HydraError>;

    async fn accept_logout_request(&self, challenge: &str) -> Result<String, HydraError>;

    async fn reject_logout_request(&self, challenge: &str) -> Result<(), HydraError>;

    async fn introspect_token(&self, token: &str) -> Result<TokenIntrospection, HydraError>;

    /// Exchange an authorization code at the token endpoint with the client credentials.
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, HydraError>;
}
