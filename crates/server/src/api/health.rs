//! Liveness probe for the container orchestrator.
//!
//! The probe answers from the router alone. A down database or OAuth2
//! provider shows up as failing sign-ins, not as a restart loop.

pub const MISC_TAG: &str = "Miscellaneous";

#[tracing::instrument(level = "trace")]
#[utoipa::path(
    method(get, head),
    path = "/healthz",
    tag = MISC_TAG,
    operation_id = "Liveness",
    summary = "Account service liveness",
    description = "Answers `ok` as soon as the account service accepts connections. \
                   Neither the user database nor the OAuth2 admin API is contacted.",
    responses(
        (status = 200, description = "Account service is up", body = str, content_type = "text/plain", example = "ok")
    )
)]
pub async fn health() -> &'static str {
    "ok"
}
