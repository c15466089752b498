//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Server,
    Upstream,
    Client,
    Configuration,
    Io,
    Cancelled,
}

/// Suggested next step for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Start a new device-code login.
    Relogin,
    RetryLater,
    CheckConfiguration,
    CheckRequest,
    CheckProxyLogs,
    None,
}

impl RecoverySuggestion {
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Relogin => Some("run `oathbridge logout` then `oathbridge login` to authorize again"),
            Self::RetryLater => Some("the provider or network looks unavailable, retry later"),
            Self::CheckConfiguration => Some("check OATHBRIDGE_* environment variables"),
            Self::CheckRequest => Some("the request was malformed"),
            Self::CheckProxyLogs => Some("check the proxy logs for the rejected request"),
            Self::None => None,
        }
    }
}
