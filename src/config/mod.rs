//! Configuration (layered: explicit overrides > environment > defaults).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::store::default_cache_path;
use crate::error::BridgeError;
use crate::util::http::DEFAULT_TIMEOUT;

pub const ENV_CLIENT_ID: &str = "OATHBRIDGE_CLIENT_ID";
pub const ENV_API_URL: &str = "OATHBRIDGE_API_URL";
pub const ENV_SCOPE: &str = "OATHBRIDGE_SCOPE";
pub const ENV_TOKEN_PATH: &str = "OATHBRIDGE_TOKEN_PATH";
pub const ENV_RESOLVER_ADDR: &str = "OATHBRIDGE_RESOLVER_ADDR";
pub const ENV_ECHO_ADDR: &str = "OATHBRIDGE_ECHO_ADDR";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "OATHBRIDGE_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost/";
pub const DEFAULT_SCOPE: &str = "read:user user:email";
pub const DEFAULT_RESOLVER_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_ECHO_ADDR: &str = "0.0.0.0:3000";

/// Process configuration, built once and passed to each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// OAuth app client id; only the login flow needs it.
    pub client_id: Option<String>,
    pub api_url: String,
    pub scope: String,
    pub token_path: PathBuf,
    pub resolver_addr: SocketAddr,
    pub echo_addr: SocketAddr,
    pub http_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_path: default_cache_path(),
            resolver_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            echo_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            http_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    /// Load `.env` if present, then read `OATHBRIDGE_*` variables.
    pub fn from_env() -> Result<Self, BridgeError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.client_id = get(ENV_CLIENT_ID);
        match get(ENV_API_URL) {
            Some(url) => config.api_url = url,
            None => tracing::info!(
                default = DEFAULT_API_URL,
                "{ENV_API_URL} was not set, using default"
            ),
        }
        if let Some(scope) = get(ENV_SCOPE) {
            config.scope = scope;
        }
        if let Some(path) = get(ENV_TOKEN_PATH) {
            config.token_path = PathBuf::from(path);
        }
        if let Some(addr) = get(ENV_RESOLVER_ADDR) {
            config.resolver_addr = parse_addr(ENV_RESOLVER_ADDR, &addr)?;
        }
        if let Some(addr) = get(ENV_ECHO_ADDR) {
            config.echo_addr = parse_addr(ENV_ECHO_ADDR, &addr)?;
        }
        if let Some(secs) = get(ENV_HTTP_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                BridgeError::Configuration(format!("{ENV_HTTP_TIMEOUT_SECS} must be whole seconds, got `{secs}`"))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// The OAuth client id, or a configuration error naming the variable.
    pub fn require_client_id(&self) -> Result<&str, BridgeError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| BridgeError::Configuration(format!("{ENV_CLIENT_ID} is required")))
    }
}

fn parse_addr(key: &str, value: &str) -> Result<SocketAddr, BridgeError> {
    value
        .trim()
        .parse()
        .map_err(|_| BridgeError::Configuration(format!("{key} is not a socket address: `{value}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = BridgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.resolver_addr, DEFAULT_RESOLVER_ADDR.parse().unwrap());
        assert_eq!(config.echo_addr, DEFAULT_ECHO_ADDR.parse().unwrap());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(config.client_id.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "Iv1.abc"),
            (ENV_API_URL, "http://proxy.internal/"),
            (ENV_TOKEN_PATH, "/tmp/token.toml"),
            (ENV_RESOLVER_ADDR, "127.0.0.1:4001"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
        ]))
        .unwrap();
        assert_eq!(config.require_client_id().unwrap(), "Iv1.abc");
        assert_eq!(config.api_url, "http://proxy.internal/");
        assert_eq!(config.token_path, PathBuf::from("/tmp/token.toml"));
        assert_eq!(config.resolver_addr.port(), 4001);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn blank_client_id_is_missing() {
        let config = BridgeConfig::from_lookup(lookup(&[(ENV_CLIENT_ID, "  ")])).unwrap();
        let err = config.require_client_id().unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(ENV_ECHO_ADDR, "not-an-addr")])),
            Err(BridgeError::Configuration(_))
        ));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(ENV_HTTP_TIMEOUT_SECS, "ten")])),
            Err(BridgeError::Configuration(_))
        ));
    }
}
