//! Device token poller.
//!
//! Drives one [`DeviceCodeGrant`] from `Polling` to `Succeeded`, `Expired` or
//! `Fatal`. Every wait is a cancellable `tokio` sleep; the deadline is the
//! grant's absolute expiry, never a poll count.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::device_code::{DeviceCodeGrant, DeviceCodeProvider, PollOutcome};
use super::error::AuthError;
use super::token::AccessToken;

/// Added on top of the provider interval to stay clear of its rate limiter.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(2);

/// Widening applied on `slow_down` when the provider sends no new interval (RFC 8628 §3.5).
pub const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Succeeded,
    Expired,
    Fatal,
}

/// Minimum spacing between two polls of `grant`.
pub fn poll_interval(grant: &DeviceCodeGrant) -> Duration {
    grant.interval.saturating_add(SAFETY_MARGIN)
}

/// Polls a device-code grant until it yields a token, expires, or fails.
///
/// Run one poller per grant. To keep other work moving, spawn
/// [`DevicePoller::poll`] on its own task.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use oathbridge::auth::providers::github::GitHubDeviceAuth;
/// use oathbridge::auth::{DeviceCodeProvider, DevicePoller};
///
/// # async fn example() -> Result<(), oathbridge::auth::AuthError> {
/// let auth = Arc::new(GitHubDeviceAuth::new(reqwest::Client::new(), "Iv1.0123456789abcdef"));
/// let grant = auth.start_device_code("read:user").await?;
/// let token = DevicePoller::new(auth).poll(&grant).await?;
/// # Ok(())
/// # }
/// ```
pub struct DevicePoller {
    provider: Arc<dyn DeviceCodeProvider>,
    cancel: CancellationToken,
    state: PollerState,
    attempts: u32,
}

impl DevicePoller {
    pub fn new(provider: Arc<dyn DeviceCodeProvider>) -> Self {
        Self {
            provider,
            cancel: CancellationToken::new(),
            state: PollerState::Idle,
            attempts: 0,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Token-exchange requests issued by the last [`poll`](Self::poll).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn poll(&mut self, grant: &DeviceCodeGrant) -> Result<AccessToken, AuthError> {
        self.state = PollerState::Polling;
        self.attempts = 0;
        let deadline = Instant::now() + grant.remaining(Utc::now());
        let mut interval = poll_interval(grant);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.fail(AuthError::Cancelled)),
                _ = tokio::time::sleep(interval) => {}
            }

            if Instant::now() >= deadline || grant.is_expired_at(Utc::now()) {
                tracing::warn!(
                    provider = %grant.provider,
                    expires_at = %grant.expires_at,
                    "device code expired, a new login is required"
                );
                self.state = PollerState::Expired;
                return Err(AuthError::Expired {
                    expires_at: grant.expires_at,
                });
            }

            self.attempts += 1;
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.fail(AuthError::Cancelled)),
                outcome = self.provider.poll_device_code(grant) => outcome,
            };

            match outcome {
                Ok(PollOutcome::Success(token)) => {
                    tracing::info!(
                        provider = %grant.provider,
                        attempts = self.attempts,
                        "device authorization granted"
                    );
                    self.state = PollerState::Succeeded;
                    return Ok(token);
                }
                Ok(PollOutcome::Pending) => {
                    tracing::debug!(provider = %grant.provider, "authorization pending");
                }
                Ok(PollOutcome::SlowDown { interval: requested }) => {
                    interval = match requested {
                        Some(requested) => requested.saturating_add(SAFETY_MARGIN).max(interval),
                        None => interval.saturating_add(SLOW_DOWN_STEP),
                    };
                    tracing::warn!(
                        provider = %grant.provider,
                        interval_ms = interval.as_millis() as u64,
                        "provider asked to slow down, widening poll interval"
                    );
                }
                Ok(PollOutcome::TransientError(cause)) => {
                    tracing::warn!(
                        provider = %grant.provider,
                        error = %cause,
                        "poll failed with transient error, retrying"
                    );
                }
                Ok(PollOutcome::ExpiredOrDenied(body)) => {
                    tracing::warn!(
                        provider = %grant.provider,
                        error_code = %body.error,
                        error_description = body.error_description.as_deref().unwrap_or_default(),
                        error_uri = body.error_uri.as_deref().unwrap_or_default(),
                        "device authorization ended by provider"
                    );
                    return Err(self.fail(AuthError::from(body)));
                }
                Err(err) => {
                    tracing::warn!(provider = %grant.provider, error = %err, "poll failed");
                    return Err(self.fail(err));
                }
            }
        }
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = PollerState::Fatal;
        err
    }
}
