use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_PROVIDER: &str = "x-user-provider";
pub const HEADER_USER_USERNAME: &str = "x-user-username";
pub const HEADER_USER_EMAIL: &str = "x-user-email";

/// Identity forwarded by the proxy in trusted `X-User-*` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedUser {
    pub id: String,
    pub provider: String,
    pub username: String,
    pub email: String,
}

impl ProxiedUser {
    /// `None` when the proxy forwarded no user id (anonymous request).
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        let id = get(HEADER_USER_ID);
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id,
            provider: get(HEADER_USER_PROVIDER),
            username: get(HEADER_USER_USERNAME),
            email: get(HEADER_USER_EMAIL),
        })
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hello user {}\nYou logged in with {} using the username {} and the email {}\n",
            self.id, self.provider, self.username, self.email
        )
    }
}

pub const ANONYMOUS_GREETING: &str = "Hello logged-out user";

/// Plain-text endpoint echoing the proxied identity back to the caller.
pub fn echo_router() -> Router {
    Router::new()
        .route("/", any(echo))
        .fallback(echo)
        .layer(TraceLayer::new_for_http())
}

async fn echo(headers: HeaderMap) -> impl IntoResponse {
    let body = match ProxiedUser::from_headers(&headers) {
        Some(user) => user.greeting(),
        None => ANONYMOUS_GREETING.to_string(),
    };
    ([(CONTENT_TYPE, "text/plain")], body)
}
