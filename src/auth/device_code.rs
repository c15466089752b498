use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumString;

use super::error::AuthError;
use super::token::AccessToken;

/// Grant type sent with every token-exchange poll.
pub const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Poll interval assumed when the provider omits one (RFC 8628 §3.2).
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// One device authorization attempt, as issued by the provider.
///
/// # Example
/// ```
/// use oathbridge::auth::{DeviceCodeGrant, DeviceCodeResponse};
/// use chrono::{Duration, Utc};
///
/// let issued_at = Utc::now();
/// let grant = DeviceCodeGrant::from_response(
///     "github",
///     DeviceCodeResponse {
///         device_code: "3584d83530557fdd1f46af8289938c8ef79f9dc5".to_string(),
///         user_code: "WDJB-MJHT".to_string(),
///         verification_uri: "https://github.com/login/device".to_string(),
///         expires_in: 900,
///         interval: 5,
///     },
///     issued_at,
/// );
/// assert_eq!(grant.expires_at, issued_at + Duration::seconds(900));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCodeGrant {
    pub provider: String,
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_at: DateTime<Utc>,
    pub interval: Duration,
}

impl DeviceCodeGrant {
    pub fn from_response(
        provider: impl Into<String>,
        response: DeviceCodeResponse,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expires_in = i64::try_from(response.expires_in).unwrap_or(i64::MAX);
        let expires_at = issued_at
            .checked_add_signed(chrono::Duration::seconds(expires_in))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            provider: provider.into(),
            device_code: response.device_code,
            user_code: response.user_code,
            verification_uri: response.verification_uri,
            expires_at,
            interval: Duration::from_secs(response.interval),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before the grant expires, zero once it has.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Device-code endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

/// Structured error body of a failed token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Error codes a device-flow token endpoint may return.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceFlowErrorCode {
    AuthorizationPending,
    SlowDown,
    ExpiredToken,
    AccessDenied,
    IncorrectClientCredentials,
    IncorrectDeviceCode,
    UnsupportedGrantType,
    DeviceFlowDisabled,
    #[strum(default)]
    Other(String),
}

impl DeviceFlowErrorCode {
    pub fn parse(code: &str) -> Self {
        // `Other` is the strum default, so parsing never fails.
        Self::from_str(code).unwrap_or_else(|_| Self::Other(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationPending => "authorization_pending",
            Self::SlowDown => "slow_down",
            Self::ExpiredToken => "expired_token",
            Self::AccessDenied => "access_denied",
            Self::IncorrectClientCredentials => "incorrect_client_credentials",
            Self::IncorrectDeviceCode => "incorrect_device_code",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::DeviceFlowDisabled => "device_flow_disabled",
            Self::Other(code) => code,
        }
    }

    /// Only pending and slow-down keep the poll loop alive.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AuthorizationPending | Self::SlowDown)
    }
}

/// Result of a single token-exchange attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Success(AccessToken),
    Pending,
    /// The provider asked for wider spacing. Carries its new interval when it sent one.
    SlowDown { interval: Option<Duration> },
    ExpiredOrDenied(ProviderErrorBody),
    TransientError(String),
}

/// Token endpoint payload; success and error share one body shape.
#[derive(Debug, Default, Deserialize)]
struct TokenResponseBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_uri: Option<String>,
    #[serde(default)]
    interval: Option<u64>,
}

/// Classify a raw token-exchange body into a [`PollOutcome`].
///
/// A non-empty `access_token` always wins. Without one, the `error` code
/// decides; a body carrying neither is rejected instead of polled again.
pub fn classify_token_response(provider: &str, body: &[u8]) -> Result<PollOutcome, AuthError> {
    let payload: TokenResponseBody = serde_json::from_slice(body)
        .map_err(|e| AuthError::UnexpectedResponse(format!("undecodable token response: {e}")))?;

    if let Some(access_token) = payload.access_token.filter(|t| !t.is_empty()) {
        let mut token = AccessToken::new(provider, access_token).with_issued_at(Utc::now());
        if let Some(token_type) = payload.token_type {
            token = token.with_token_type(token_type);
        }
        if let Some(scope) = payload.scope.as_deref() {
            token = token.with_scope_list(scope);
        }
        return Ok(PollOutcome::Success(token));
    }

    let Some(error) = payload.error.filter(|e| !e.is_empty()) else {
        return Err(AuthError::UnexpectedResponse(
            "response carried neither access_token nor error".to_string(),
        ));
    };

    let outcome = match DeviceFlowErrorCode::parse(&error) {
        DeviceFlowErrorCode::AuthorizationPending => PollOutcome::Pending,
        DeviceFlowErrorCode::SlowDown => PollOutcome::SlowDown {
            interval: payload.interval.map(Duration::from_secs),
        },
        _ => PollOutcome::ExpiredOrDenied(ProviderErrorBody {
            error,
            error_description: payload.error_description,
            error_uri: payload.error_uri,
        }),
    };
    Ok(outcome)
}

/// A provider able to run the device authorization grant.
///
/// Each call makes exactly one request; looping belongs to
/// [`DevicePoller`](super::poller::DevicePoller).
#[async_trait]
pub trait DeviceCodeProvider: Send + Sync {
    /// Provider key, e.g. `"github"`.
    fn provider(&self) -> &str;

    /// Request a fresh device/user code pair.
    async fn start_device_code(&self, scope: &str) -> Result<DeviceCodeGrant, AuthError>;

    /// Exchange the device code for a token once.
    async fn poll_device_code(&self, grant: &DeviceCodeGrant) -> Result<PollOutcome, AuthError>;
}
