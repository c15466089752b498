//! Crate-wide error type.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::{AuthError, CacheError};
use crate::client::UpstreamError;
use crate::session::SessionError;

/// Primary error type surfaced to binaries and embedders.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("No cached {0} token, run `oathbridge login` first")]
    NotLoggedIn(String),

    #[error("Token cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::NotLoggedIn(_) => ErrorCategory::Authentication,
            Self::Auth(err) => match err {
                AuthError::Initiation { status: None, .. } => ErrorCategory::Network,
                AuthError::Initiation {
                    status: Some(500..=599),
                    ..
                } => ErrorCategory::Server,
                AuthError::Initiation { .. } => ErrorCategory::Configuration,
                AuthError::PollTerminal { .. } | AuthError::Expired { .. } => {
                    ErrorCategory::Authentication
                }
                AuthError::UnexpectedResponse(_) => ErrorCategory::Upstream,
                AuthError::Cancelled => ErrorCategory::Cancelled,
            },
            Self::Session(err) => match err {
                SessionError::MalformedHeader(_) | SessionError::UnknownProvider(_) => {
                    ErrorCategory::Client
                }
                SessionError::DuplicateProvider(_) => ErrorCategory::Configuration,
                SessionError::Resolution { status: None, .. } => ErrorCategory::Network,
                _ if err.is_rejected_token() => ErrorCategory::Authentication,
                SessionError::Resolution { .. } => ErrorCategory::Upstream,
            },
            Self::Upstream(err) => match err {
                UpstreamError::Status { status: 401 | 403 } => ErrorCategory::Authentication,
                UpstreamError::Status {
                    status: 500..=599,
                } => ErrorCategory::Server,
                UpstreamError::Status { .. } => ErrorCategory::Upstream,
                UpstreamError::Transport(_) => ErrorCategory::Network,
            },
            Self::Cache(_) | Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether repeating the same top-level attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::Relogin,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Client => RecoverySuggestion::CheckRequest,
            ErrorCategory::Upstream => RecoverySuggestion::CheckProxyLogs,
            ErrorCategory::Io | ErrorCategory::Cancelled => RecoverySuggestion::None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BridgeError>;
