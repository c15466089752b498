use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::session::{CanonicalSession, SessionError, SessionResolver};

pub const PROVIDER: &str = "github";

const DEFAULT_USER_URL: &str = "https://api.github.com/user";

/// Resolves GitHub OAuth tokens through `GET /user`.
#[derive(Debug, Clone)]
pub struct GitHubSessionResolver {
    client: reqwest::Client,
    user_url: String,
}

impl GitHubSessionResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            user_url: DEFAULT_USER_URL.to_string(),
        }
    }

    pub fn with_user_url(mut self, url: impl Into<String>) -> Self {
        self.user_url = url.into();
        self
    }

    /// Fetch the user owning `token`.
    pub async fn fetch_user(&self, token: &str) -> Result<GitHubUser, SessionError> {
        let resp = self
            .client
            .get(&self.user_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("token {token}"))
            .send()
            .await
            .map_err(|e| SessionError::resolution(PROVIDER, None, e.to_string()))?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(SessionError::resolution(
                PROVIDER,
                Some(status.as_u16()),
                format!("expected 200 but received {}", status.as_u16()),
            ));
        }
        resp.json::<GitHubUser>()
            .await
            .map_err(|e| SessionError::resolution(PROVIDER, Some(status.as_u16()), e.to_string()))
    }
}

#[async_trait]
impl SessionResolver for GitHubSessionResolver {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn resolve(&self, token: &str) -> Result<CanonicalSession, SessionError> {
        let user = self.fetch_user(token).await?;
        tracing::debug!(
            provider = PROVIDER,
            user_id = user.id,
            login = user.login.as_deref().unwrap_or_default(),
            "resolved GitHub user"
        );
        Ok(user.into_session())
    }
}

/// `GET /user` payload, trimmed to the fields worth keeping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubUser {
    /// Unique across all GitHub accounts; never reused.
    pub id: u64,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub gravatar_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GitHubUser {
    pub fn into_session(self) -> CanonicalSession {
        CanonicalSession::new(
            self.id.to_string(),
            PROVIDER,
            self.login.unwrap_or_default(),
            self.email.unwrap_or_default(),
        )
    }
}
