//! HTTP client construction.

use std::time::Duration;

use crate::error::BridgeError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("oathbridge/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by every outbound call of one process.
///
/// GitHub's REST API rejects requests without a `User-Agent`, so one is
/// always set. Redirects are never followed: a redirected identity lookup
/// is a failed lookup.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, BridgeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| BridgeError::Configuration(format!("failed to build HTTP client: {e}")))
}
