//! URLs that send the browser to the provider.

use crate::config::AppConfig;
use url::Url;

/// Authorization-code URL for this client.
///
/// `max_age=0` forces the provider to ask for the login again instead of
/// silently reusing an existing session.
pub fn auth_code_url(config: &AppConfig, state: &str, nonce: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(&config.oauth2.auth_url())?;
    url.query_pairs_mut()
        .append_pair("client_id", &config.oauth2.client_id)
        .append_pair("max_age", "0")
        .append_pair("nonce", nonce)
        .append_pair("redirect_uri", &config.callback_url())
        .append_pair("response_type", "code")
        .append_pair("scope", &config.oauth2.scopes.join(" "))
        .append_pair("state", state);
    Ok(url.into())
}

/// RP-initiated logout URL. Empty arguments are left out of the query.
pub fn logout_url(
    config: &AppConfig,
    id_token_hint: &str,
    state: &str,
    post_logout_redirect_uri: &str,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(&config.oauth2.logout_url())?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in [
            ("id_token_hint", id_token_hint),
            ("state", state),
            ("post_logout_redirect_uri", post_logout_redirect_uri),
        ] {
            if !value.is_empty() {
                query.append_pair(key, value);
            }
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, HttpConfig, OAuth2Config};
    use std::collections::HashMap;

    fn config() -> AppConfig {
        AppConfig {
            http: HttpConfig {
                proto: "http".into(),
                listen_addr: "0.0.0.0".into(),
                port: 3000,
            },
            oauth2: OAuth2Config {
                client_id: "client-auth-code".into(),
                client_secret: "secret".into(),
                hydra_proto: "http".into(),
                redirect_addr: "127.0.0.1:3000".into(),
                hydra_public_host: "127.0.0.1:4444".into(),
                hydra_public_host_private_lan: "hydra:4444".into(),
                hydra_admin_host_private_lan: "hydra:4445".into(),
                scopes: vec!["openid".into(), "offline".into()],
                remember_for: 3600,
            },
            database: DatabaseConfig {
                dsn: "sqlite::memory:".into(),
                salt: "0123456789abcdef".into(),
            },
        }
    }

    #[test]
    fn test_auth_code_url() {
        let raw = auth_code_url(&config(), "stateabc", "noncexyz").unwrap();
        let url = Url::parse(&raw).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/oauth2/auth");
        assert_eq!(query["client_id"], "client-auth-code");
        assert_eq!(query["redirect_uri"], "http://127.0.0.1:3000/callback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "openid offline");
        assert_eq!(query["state"], "stateabc");
        assert_eq!(query["nonce"], "noncexyz");
        assert_eq!(query["max_age"], "0");
    }

    #[test]
    fn test_logout_url_skips_empty_params() {
        let raw = logout_url(&config(), "eyJ.id.token", "", "").unwrap();
        assert_eq!(
            raw,
            "http://127.0.0.1:4444/oauth2/sessions/logout?id_token_hint=eyJ.id.token"
        );

        let raw = logout_url(&config(), "t", "s", "http://127.0.0.1:3000/").unwrap();
        assert!(raw.contains("state=s"));
        assert!(raw.contains("post_logout_redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2F"));
    }
}
