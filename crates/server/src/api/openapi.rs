//! OpenAPI/Utoipa configuration.

use crate::api::{health::MISC_TAG, users::USERS_TAG};
use crate::oauth2::OAUTH2_TAG;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    #[tracing::instrument(skip(self, openapi))]
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            // Set by /callback after a successful sign-in.
            components.add_security_scheme(
                "AccessToken",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "access_token",
                    "OAuth2 access token stored by the sign-in flow.",
                ))),
            );

            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .description(Some("OAuth2 access token issued by the provider."))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Service Account API",
        version = "1.0.0",
        description = "Login, consent and logout pages for an OAuth2/OpenID Connect provider, and the account API."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = OAUTH2_TAG, description = "OAuth2 login, consent and logout flow"),
        (name = USERS_TAG, description = "Account API endpoints")
    )
)]
pub struct ApiDoc;
