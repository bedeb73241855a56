//! Cookies holding the tokens of the signed-in browser.

use crate::hydra::TokenSet;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::format_description::well_known::Rfc3339;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const ACCESS_TOKEN_EXPIRES_IN: &str = "access_token_expires_in";
pub const ID_TOKEN: &str = "id_token";
/// `state` of the last issued authorization-code URL.
pub const OAUTH2_STATE: &str = "oauth2_state";

const TOKEN_COOKIES: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, ACCESS_TOKEN_EXPIRES_IN, ID_TOKEN];

fn secure_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn store_tokens(jar: CookieJar, tokens: &TokenSet) -> CookieJar {
    let expires_in = tokens
        .expiry
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_default();

    jar.add(secure_cookie(ACCESS_TOKEN, tokens.access_token.clone()))
        .add(secure_cookie(REFRESH_TOKEN, tokens.refresh_token.clone()))
        .add(secure_cookie(ACCESS_TOKEN_EXPIRES_IN, expires_in))
        .add(secure_cookie(ID_TOKEN, tokens.id_token.clone()))
}

/// Expired cookie overwriting `name`, sent whether or not the request carried it.
fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Expire all token cookies.
pub fn clear_tokens(jar: CookieJar) -> CookieJar {
    TOKEN_COOKIES
        .into_iter()
        .fold(jar, |jar, name| jar.add(removal(name)))
}

pub fn store_state(jar: CookieJar, state: String) -> CookieJar {
    let mut cookie = secure_cookie(OAUTH2_STATE, state);
    cookie.set_max_age(time::Duration::minutes(10));
    jar.add(cookie)
}

/// Expire the pending `state` and return its value.
pub fn take_state(jar: CookieJar) -> (CookieJar, Option<String>) {
    let state = jar.get(OAUTH2_STATE).map(|c| c.value().to_string());
    (jar.add(removal(OAUTH2_STATE)), state)
}

/// Value of a non-empty cookie.
pub fn value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_store_and_clear_tokens() {
        let tokens = TokenSet {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            id_token: "idt".into(),
            expiry: Some(OffsetDateTime::UNIX_EPOCH),
        };

        let jar = store_tokens(CookieJar::new(), &tokens);
        assert_eq!(value(&jar, ACCESS_TOKEN).as_deref(), Some("at"));
        assert_eq!(
            value(&jar, ACCESS_TOKEN_EXPIRES_IN).as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
        let cookie = jar.get(ID_TOKEN).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));

        let jar = clear_tokens(jar);
        for name in TOKEN_COOKIES {
            assert!(value(&jar, name).is_none(), "{name} still set");
        }
    }

    #[test]
    fn test_take_state() {
        let jar = store_state(CookieJar::new(), "abc".into());
        let (jar, state) = take_state(jar);
        assert_eq!(state.as_deref(), Some("abc"));
        assert!(value(&jar, OAUTH2_STATE).is_none());
    }
}
