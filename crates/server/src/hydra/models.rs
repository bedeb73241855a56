//! Wire types of the provider's admin and token APIs.
//!
//! The admin API sends `null` for empty collections and strings, so those
//! fields fall back to their defaults instead of failing deserialization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OidcContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub login_hint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ui_locales: Vec<String>,
    #[serde(default)]
    pub acr_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OAuth2Client {
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub redirect_uris: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: String,
}

impl OAuth2Client {
    /// Name to show the user, the client id when no name is registered.
    pub fn display_name(&self) -> &str {
        if self.client_name.is_empty() {
            &self.client_id
        } else {
            &self.client_name
        }
    }
}

/// `GET /oauth2/auth/requests/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub challenge: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_scope: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_access_token_audience: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oidc_context: OidcContext,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client: OAuth2Client,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_url: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl LoginRequest {
    pub fn login_hint(&self) -> &str {
        &self.oidc_context.login_hint
    }
}

/// `GET /oauth2/auth/requests/consent`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub challenge: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_scope: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requested_access_token_audience: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client: OAuth2Client,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oidc_context: OidcContext,
    #[serde(default)]
    pub login_session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptLoginRequest {
    pub subject: String,
    pub remember: bool,
    pub remember_for: i64,
}

/// Extra claims for the issued tokens. Empty objects unless a caller fills them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsentRequestSession {
    pub access_token: serde_json::Map<String, Value>,
    pub id_token: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptConsentRequest {
    pub grant_scope: Vec<String>,
    pub grant_access_token_audience: Vec<String>,
    pub remember: bool,
    pub remember_for: i64,
    pub session: ConsentRequestSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectRequest {
    pub error: String,
    pub error_description: String,
}

impl RejectRequest {
    /// The rejection sent when the resource owner presses "Deny access".
    pub fn access_denied() -> Self {
        Self {
            error: "access_denied".to_string(),
            error_description: "The resource owner denied the request".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletedRequest {
    pub redirect_to: String,
}

/// `POST /oauth2/introspect`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenIntrospection {
    pub active: bool,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Raw answer of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Tokens obtained by exchanging an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    /// Absolute expiry of the access token. `None` when the provider sent no
    /// `expires_in` or one that does not fit a date.
    pub expiry: Option<OffsetDateTime>,
}

impl TokenSet {
    pub(crate) fn from_response(resp: TokenResponse, now: OffsetDateTime) -> Self {
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.unwrap_or_default(),
            id_token: resp.id_token.unwrap_or_default(),
            expiry: resp
                .expires_in
                .and_then(|secs| now.checked_add(time::Duration::seconds(secs))),
        }
    }
}

/// Error body of both the admin and the public API.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GenericError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GenericError {
    pub fn describe(self) -> Option<String> {
        self.error_description
            .or(self.message)
            .or(self.error)
            .filter(|s| !s.is_empty())
    }
}
