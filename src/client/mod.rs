//! Downstream calls authenticated with a bearer credential.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use thiserror::Error;

use crate::session::BearerCredential;

/// Failure of an authenticated downstream call.
///
/// Status codes are deliberately not interpreted here; the proxy in front of
/// the API decides what a rejection means.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream returned non-200 status {status}, check the proxy logs")]
    Status { status: u16 },
    #[error("Upstream request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// Thin caller for APIs sitting behind the authenticating proxy.
///
/// # Example
/// ```no_run
/// use oathbridge::client::ApiClient;
/// use oathbridge::session::BearerCredential;
///
/// # async fn example() -> Result<(), oathbridge::client::UpstreamError> {
/// let api = ApiClient::new(reqwest::Client::new());
/// let body = api
///     .get_text("http://localhost/", &BearerCredential::new("github", "gho_abc"))
///     .await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `url` and return the body of a 200 response.
    pub async fn get_text(
        &self,
        url: &str,
        credential: &BearerCredential,
    ) -> Result<String, UpstreamError> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "text/plain")
            .header(AUTHORIZATION, credential.to_string())
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::OK {
            tracing::warn!(url, status = status.as_u16(), "upstream rejected request");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }
}
