use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::auth::device_code::{
    classify_token_response, DeviceCodeGrant, DeviceCodeProvider, DeviceCodeResponse,
    PollOutcome, DEVICE_CODE_GRANT_TYPE,
};
use crate::auth::error::AuthError;

pub const PROVIDER: &str = "github";
pub const DEFAULT_SCOPE: &str = "read:user user:email";

const DEFAULT_DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const DEFAULT_ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// GitHub OAuth app device-code flow.
///
/// # Example
/// ```no_run
/// use oathbridge::auth::providers::github::GitHubDeviceAuth;
/// use oathbridge::auth::DeviceCodeProvider;
///
/// # async fn example() -> Result<(), oathbridge::auth::AuthError> {
/// let auth = GitHubDeviceAuth::new(reqwest::Client::new(), "Iv1.0123456789abcdef");
/// let grant = auth.start_device_code("read:user user:email").await?;
/// println!("enter {} at {}", grant.user_code, grant.verification_uri);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubDeviceAuth {
    client: reqwest::Client,
    client_id: String,
    device_code_url: String,
    access_token_url: String,
}

impl GitHubDeviceAuth {
    pub fn new(client: reqwest::Client, client_id: impl Into<String>) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = url.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl DeviceCodeProvider for GitHubDeviceAuth {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn start_device_code(&self, scope: &str) -> Result<DeviceCodeGrant, AuthError> {
        let issued_at = Utc::now();
        let resp = self
            .client
            .post(&self.device_code_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope)])
            .send()
            .await
            .map_err(|e| AuthError::initiation(None, e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AuthError::initiation(Some(status.as_u16()), text));
        }
        let payload: DeviceCodeResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::initiation(Some(status.as_u16()), e.to_string()))?;
        tracing::debug!(
            provider = PROVIDER,
            expires_in = payload.expires_in,
            interval = payload.interval,
            "issued device code"
        );
        Ok(DeviceCodeGrant::from_response(PROVIDER, payload, issued_at))
    }

    async fn poll_device_code(&self, grant: &DeviceCodeGrant) -> Result<PollOutcome, AuthError> {
        let resp = match self
            .client
            .post(&self.access_token_url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("device_code", grant.device_code.as_str()),
                ("grant_type", DEVICE_CODE_GRANT_TYPE),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Ok(PollOutcome::TransientError(e.to_string())),
        };
        let status = resp.status();
        if status.is_server_error() {
            return Ok(PollOutcome::TransientError(format!(
                "token endpoint returned status {status}"
            )));
        }
        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(e) => return Ok(PollOutcome::TransientError(e.to_string())),
        };
        classify_token_response(PROVIDER, &body)
    }
}
