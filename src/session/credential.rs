use std::fmt;
use std::str::FromStr;

use super::error::SessionError;

const BEARER_SCHEME: &str = "Bearer";

/// `Authorization: Bearer <provider> <token>` split into its parts.
///
/// # Example
/// ```
/// use oathbridge::session::BearerCredential;
///
/// let credential: BearerCredential = "Bearer github gho_abc".parse()?;
/// assert_eq!(credential.provider, "github");
/// assert_eq!(credential.token, "gho_abc");
/// assert_eq!(credential.to_string(), "Bearer github gho_abc");
/// # Ok::<(), oathbridge::session::SessionError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    pub provider: String,
    pub token: String,
}

impl BearerCredential {
    pub fn new(provider: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            token: token.into(),
        }
    }

    /// Parse a full header value. The token is everything after the second space.
    pub fn parse(header: &str) -> Result<Self, SessionError> {
        let mut parts = header.splitn(3, ' ');
        let (Some(scheme), Some(provider), Some(token)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::MalformedHeader(
                "expected `Bearer <provider> <token>`".to_string(),
            ));
        };
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return Err(SessionError::MalformedHeader(format!(
                "unsupported scheme `{scheme}`"
            )));
        }
        if provider.is_empty() || token.trim().is_empty() {
            return Err(SessionError::MalformedHeader(
                "provider and token must be non-empty".to_string(),
            ));
        }
        Ok(Self::new(provider, token))
    }
}

impl FromStr for BearerCredential {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BEARER_SCHEME} {} {}", self.provider, self.token)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerCredential")
            .field("provider", &self.provider)
            .field("token", &"..")
            .finish()
    }
}
