use chrono::{DateTime, Utc};
use thiserror::Error;

use super::device_code::ProviderErrorBody;

/// Errors raised by the device-code flow.
///
/// Recoverable poll failures never surface here: the poller absorbs
/// `PollOutcome::Pending`, `SlowDown` and `TransientError` and keeps polling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Device code initiation failed{}: {message}", status_suffix(.status))]
    Initiation {
        status: Option<u16>,
        message: String,
    },
    #[error("Device authorization ended by provider: {code}{}", description_suffix(.description))]
    PollTerminal {
        code: String,
        description: Option<String>,
        uri: Option<String>,
    },
    #[error("Device code expired at {expires_at}, start a new login")]
    Expired { expires_at: DateTime<Utc> },
    #[error("Unexpected token response: {0}")]
    UnexpectedResponse(String),
    #[error("Device authorization cancelled")]
    Cancelled,
}

impl AuthError {
    pub(crate) fn initiation(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Initiation {
            status,
            message: message.into(),
        }
    }

    /// Whether the error ended an in-progress poll loop (as opposed to never starting one).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PollTerminal { .. } | Self::Expired { .. } | Self::UnexpectedResponse(_)
        )
    }

    /// Provider error code, when the provider supplied one.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::PollTerminal { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<ProviderErrorBody> for AuthError {
    fn from(body: ProviderErrorBody) -> Self {
        Self::PollTerminal {
            code: body.error,
            description: body.error_description,
            uri: body.error_uri,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

fn description_suffix(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Failures of the local token cache. Never fatal to an authorization flow.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CacheError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for CacheError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for CacheError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
