use oathbridge::client::{ApiClient, UpstreamError};
use oathbridge::session::BearerCredential;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential() -> BearerCredential {
    BearerCredential::new("github", "gho_abc")
}

#[tokio::test]
async fn sends_bearer_credential_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Bearer github gho_abc"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello user 42\n"))
        .expect(1)
        .mount(&server)
        .await;

    let body = ApiClient::new(reqwest::Client::new())
        .get_text(&format!("{}/", server.uri()), &credential())
        .await
        .unwrap();

    assert_eq!(body, "Hello user 42\n");
}

#[tokio::test]
async fn non_200_statuses_are_reported_verbatim() {
    for status in [201u16, 401, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let err = ApiClient::new(reqwest::Client::new())
            .get_text(&server.uri(), &credential())
            .await
            .unwrap_err();

        assert!(
            matches!(err, UpstreamError::Status { status: s } if s == status),
            "status {status} gave {err:?}"
        );
    }
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let err = ApiClient::new(reqwest::Client::new())
        .get_text("http://127.0.0.1:1/", &credential())
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Transport(_)));
}
