use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::device_code::{DeviceCodeGrant, DeviceCodeProvider};
use super::error::AuthError;
use super::poller::DevicePoller;
use super::store::TokenCache;
use super::token::AccessToken;

/// Where a token returned by [`AuthService::login`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cache,
    DeviceFlow,
}

/// Cache-aware device-code login.
///
/// Presenting the user code is left to the caller; the service only returns
/// typed results and errors. Cache failures are logged and never fail a login.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use oathbridge::auth::providers::github::GitHubDeviceAuth;
/// use oathbridge::auth::service::AuthService;
/// use oathbridge::auth::FileTokenCache;
///
/// # async fn example() -> Result<(), oathbridge::auth::AuthError> {
/// let provider = Arc::new(GitHubDeviceAuth::new(reqwest::Client::new(), "Iv1.0123456789abcdef"));
/// let service = AuthService::new(provider, Arc::new(FileTokenCache::new_default()));
/// let (token, _source) = service
///     .login(|grant| println!("enter {} at {}", grant.user_code, grant.verification_uri))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    provider: Arc<dyn DeviceCodeProvider>,
    cache: Arc<dyn TokenCache>,
    scope: String,
    cancel: CancellationToken,
}

impl AuthService {
    pub fn new(provider: Arc<dyn DeviceCodeProvider>, cache: Arc<dyn TokenCache>) -> Self {
        Self {
            provider,
            cache,
            scope: String::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cached token for this provider, if any.
    pub fn cached_token(&self) -> Option<AccessToken> {
        self.cache
            .load()
            .filter(|token| token.provider == self.provider.provider())
    }

    /// Return the cached token, or run a fresh device-code flow and cache its result.
    pub async fn login<F>(&self, present: F) -> Result<(AccessToken, TokenSource), AuthError>
    where
        F: FnOnce(&DeviceCodeGrant),
    {
        if let Some(token) = self.cached_token() {
            tracing::info!(token = %token.redacted(), "using cached access token");
            return Ok((token, TokenSource::Cache));
        }

        let grant = self.provider.start_device_code(&self.scope).await?;
        present(&grant);

        let mut poller =
            DevicePoller::new(self.provider.clone()).with_cancellation(self.cancel.clone());
        let token = poller.poll(&grant).await?;

        if let Err(err) = self.cache.save(&token) {
            tracing::warn!(error = %err, "failed writing access token to cache, continuing");
        }
        tracing::info!(token = %token.redacted(), "retrieved new access token");
        Ok((token, TokenSource::DeviceFlow))
    }

    /// Forget the cached token. Returns whether a cache entry was removed.
    pub fn logout(&self) -> bool {
        let had_token = self.cache.load().is_some();
        if let Err(err) = self.cache.clear() {
            tracing::warn!(error = %err, "failed clearing cached access token");
            return false;
        }
        had_token
    }
}
