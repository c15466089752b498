#![cfg(feature = "github")]

use std::sync::Arc;

use oathbridge::auth::providers::github::GitHubDeviceAuth;
use oathbridge::auth::{AuthService, FileTokenCache, TokenCache, TokenSource};
use oathbridge::client::ApiClient;
use oathbridge::session::BearerCredential;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Full client flow against a fake GitHub and a fake protected API, on the real clock.
#[tokio::test]
async fn device_login_caches_token_and_calls_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/device/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "device-123",
            "user_code": "WDJB-MJHT",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900,
            "interval": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "gho_e2e",
            "token_type": "bearer",
            "scope": "read:user"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(header("authorization", "Bearer github gho_e2e"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello user 42"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileTokenCache::new(dir.path().join("access-token.toml")));
    let client = reqwest::Client::new();
    let provider = Arc::new(
        GitHubDeviceAuth::new(client.clone(), "Iv1.test")
            .with_device_code_url(format!("{}/login/device/code", server.uri()))
            .with_access_token_url(format!("{}/login/oauth/access_token", server.uri())),
    );
    let service = AuthService::new(provider, cache.clone()).with_scope("read:user");
    let api = ApiClient::new(client);
    let url = format!("{}/api", server.uri());

    let (token, source) = service.login(|_| {}).await.expect("login");
    assert_eq!(source, TokenSource::DeviceFlow);
    assert_eq!(cache.load().as_ref(), Some(&token));
    let credential = BearerCredential::new(token.provider.clone(), token.secret());
    assert_eq!(api.get_text(&url, &credential).await.unwrap(), "Hello user 42");

    // Second run is served from the cache without touching the device endpoints.
    let (cached, source) = service.login(|_| {}).await.expect("cached login");
    assert_eq!(source, TokenSource::Cache);
    let credential = BearerCredential::new(cached.provider.clone(), cached.secret());
    assert_eq!(api.get_text(&url, &credential).await.unwrap(), "Hello user 42");
}
