use thiserror::Error;

/// Errors raised while turning a bearer credential into a canonical session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Malformed authorization header: {0}")]
    MalformedHeader(String),
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Provider registered twice: {0}")]
    DuplicateProvider(String),
    #[error("Session resolution via {provider} failed{}: {message}", status_suffix(.status))]
    Resolution {
        provider: String,
        status: Option<u16>,
        message: String,
    },
}

impl SessionError {
    pub fn resolution(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Resolution {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Whether the caller sent something unusable, as opposed to an upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedHeader(_) | Self::UnknownProvider(_))
    }

    /// Whether the upstream identity provider rejected the token itself.
    pub fn is_rejected_token(&self) -> bool {
        matches!(
            self,
            Self::Resolution {
                status: Some(401 | 403),
                ..
            }
        )
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}
