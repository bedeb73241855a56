//! Provider client tests against a mocked admin API.

mod common;

use reqwest::StatusCode;
use serde_json::json;
use service_account::hydra::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentRequestSession, HydraAdmin, HydraClient,
    HydraError, RejectRequest,
};
use wiremock::matchers::{basic_auth, body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client() -> (MockServer, HydraClient) {
    let server = MockServer::start().await;
    let client = HydraClient::new(&common::test_config(&server.uri())).expect("client");
    (server, client)
}

fn redirect(to: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "redirect_to": to }))
}

#[tokio::test]
async fn test_get_login_request() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/login"))
        .and(query_param("login_challenge", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "challenge": "abc",
            "requested_scope": ["openid", "offline"],
            "requested_access_token_audience": [],
            "skip": true,
            "subject": "42",
            "oidc_context": {"login_hint": "alice@example.com"},
            "client": {"client_id": "svc", "client_name": ""},
            "request_url": "http://127.0.0.1:4444/oauth2/auth?client_id=svc",
            "session_id": "76830b22"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let login = client.get_login_request("abc").await.expect("login request");
    assert!(login.skip);
    assert_eq!(login.subject, "42");
    assert_eq!(login.login_hint(), "alice@example.com");
}

#[tokio::test]
async fn test_accept_login_request_sends_body() {
    let (server, client) = client().await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/login/accept"))
        .and(query_param("login_challenge", "abc"))
        .and(body_json(json!({
            "subject": "7",
            "remember": true,
            "remember_for": 3600
        })))
        .respond_with(redirect("http://127.0.0.1:4444/oauth2/auth?login_verifier=v"))
        .expect(1)
        .mount(&server)
        .await;

    let to = client
        .accept_login_request(
            "abc",
            &AcceptLoginRequest {
                subject: "7".to_string(),
                remember: true,
                remember_for: 3600,
            },
        )
        .await
        .expect("accept login");
    assert_eq!(to, "http://127.0.0.1:4444/oauth2/auth?login_verifier=v");
}

#[tokio::test]
async fn test_reject_requests_send_access_denied() {
    let (server, client) = client().await;
    let denied = json!({
        "error": "access_denied",
        "error_description": "The resource owner denied the request"
    });
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/login/reject"))
        .and(body_json(denied.clone()))
        .respond_with(redirect("http://client/cb?error=access_denied"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/consent/reject"))
        .and(query_param("consent_challenge", "c1"))
        .and(body_json(denied))
        .respond_with(redirect("http://client/cb?error=access_denied"))
        .expect(1)
        .mount(&server)
        .await;

    let body = RejectRequest::access_denied();
    assert_eq!(
        client.reject_login_request("abc", &body).await.unwrap(),
        "http://client/cb?error=access_denied"
    );
    assert_eq!(
        client.reject_consent_request("c1", &body).await.unwrap(),
        "http://client/cb?error=access_denied"
    );
}

#[tokio::test]
async fn test_accept_consent_request() {
    let (server, client) = client().await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/consent/accept"))
        .and(query_param("consent_challenge", "c1"))
        .and(body_json(json!({
            "grant_scope": ["openid"],
            "grant_access_token_audience": ["api"],
            "remember": false,
            "remember_for": 3600,
            "session": {"access_token": {}, "id_token": {}}
        })))
        .respond_with(redirect("http://127.0.0.1:4444/oauth2/auth?consent_verifier=v"))
        .expect(1)
        .mount(&server)
        .await;

    let to = client
        .accept_consent_request(
            "c1",
            &AcceptConsentRequest {
                grant_scope: vec!["openid".to_string()],
                grant_access_token_audience: vec!["api".to_string()],
                remember: false,
                remember_for: 3600,
                session: ConsentRequestSession::default(),
            },
        )
        .await
        .expect("accept consent");
    assert!(to.ends_with("consent_verifier=v"));
}

#[tokio::test]
async fn test_logout_requests() {
    let (server, client) = client().await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/logout/accept"))
        .and(query_param("logout_challenge", "l1"))
        .respond_with(redirect("http://127.0.0.1:4444/oauth2/sessions/logout?logout_verifier=v"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/oauth2/auth/requests/logout/reject"))
        .and(query_param("logout_challenge", "l2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let to = client.accept_logout_request("l1").await.expect("accept logout");
    assert!(to.contains("logout_verifier=v"));
    client.reject_logout_request("l2").await.expect("reject logout");
}

#[tokio::test]
async fn test_introspect_token() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/introspect"))
        .and(body_string_contains("token=at-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "7",
            "client_id": "svc",
            "scope": "openid offline"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.introspect_token("at-123").await.expect("introspect");
    assert!(info.active);
    assert_eq!(info.sub.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_exchange_code_uses_client_credentials() {
    let (server, client) = client().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(basic_auth(common::CLIENT_ID, common::CLIENT_SECRET))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "id_token": "idt",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client.exchange_code("the-code").await.expect("exchange");
    assert_eq!(tokens.access_token, "at");
    assert_eq!(tokens.refresh_token, "rt");
    assert_eq!(tokens.id_token, "idt");
    assert!(tokens.expiry.is_some());
}

#[tokio::test]
async fn test_api_error_carries_status_and_description() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/consent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Not Found",
            "error_description": "Unable to locate the requested resource"
        })))
        .mount(&server)
        .await;

    match client.get_consent_request("missing").await {
        Err(HydraError::Api { status, message }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "Unable to locate the requested resource");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let (server, client) = client().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/auth/requests/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_login_request("abc").await,
        Err(HydraError::InvalidResponse(_))
    ));
}
