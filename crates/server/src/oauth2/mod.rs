//! Browser-facing OAuth2 pages.
//!
//! The provider redirects the browser here with a login, consent or logout
//! challenge. Each handler fetches the challenge from the admin API, either
//! decides on its own (`skip`) or asks the user, and sends the browser back to
//! the URL the provider answers with.
//!
//! ## Endpoints
//!
//! - `GET|POST /signin` - Login challenge
//! - `GET|POST /signup` - Account registration
//! - `GET|POST /consent` - Consent challenge
//! - `GET|POST /logout` - Logout challenge
//! - `/backchannel-logout`, `GET /frontchannel-logout`
//! - `GET /callback` - Authorization code callback
//! - `GET /` - Home page

pub mod callback;
pub mod consent;
pub mod cookies;
pub mod links;
pub mod login;
pub mod logout;
pub mod password;
pub mod register;

pub use password::{Argon2idHasher, PasswordHasher, hashes_match, random_alpha_lower};

use crate::AppResources;
use crate::error::FlowError;
use askama::Template;
use axum::response::Html;
use utoipa_axum::router::OpenApiRouter;

/// OpenAPI tag for OAuth2 endpoints
pub const OAUTH2_TAG: &str = "OAuth2";

pub const SUBMIT_LOG_IN: &str = "Log in";
pub const SUBMIT_DENY_ACCESS: &str = "Deny access";
pub const SUBMIT_ALLOW_ACCESS: &str = "Allow access";
pub const SUBMIT_REGISTER: &str = "Register";
pub const SUBMIT_YES: &str = "Yes";
pub const SUBMIT_NO: &str = "No";

/// Length of generated `state` and `nonce` values.
pub const STATE_LENGTH: usize = 24;

pub fn router() -> OpenApiRouter<AppResources> {
    OpenApiRouter::new()
        .merge(callback::router())
        .merge(login::router())
        .merge(register::router())
        .merge(consent::router())
        .merge(logout::router())
}

fn render<T: Template>(template: &T) -> Result<Html<String>, FlowError> {
    Ok(Html(template.render()?))
}

/// The challenge must be present and non-empty.
fn require_challenge(challenge: Option<String>, kind: &str) -> Result<String, FlowError> {
    challenge.filter(|c| !c.is_empty()).ok_or_else(|| {
        FlowError::bad_request(format!(
            "Expected a {kind} challenge to be set but received none."
        ))
    })
}
