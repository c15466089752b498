//! CLI auth command handlers for login, call, status, and logout.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::providers::github::{self, GitHubDeviceAuth};
use crate::auth::{AccessToken, AuthService, FileTokenCache, TokenCache, TokenSource};
use crate::client::ApiClient;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::session::BearerCredential;
use crate::util::http::build_client;

/// Handle `oathbridge login`.
pub async fn handle_login(
    config: &BridgeConfig,
    call_api: bool,
    cancel: CancellationToken,
) -> Result<()> {
    let client_id = config.require_client_id()?;
    let client = build_client(config.http_timeout)?;
    let provider = Arc::new(GitHubDeviceAuth::new(client.clone(), client_id));
    let cache = Arc::new(FileTokenCache::new(&config.token_path));
    let service = AuthService::new(provider, cache)
        .with_scope(config.scope.clone())
        .with_cancellation(cancel);

    let (token, source) = service
        .login(|grant| {
            tracing::info!(
                code = %grant.user_code,
                url = %grant.verification_uri,
                expires_at = %grant.expires_at,
                "please enter this code"
            );
            println!("🔗 Visit: {}", grant.verification_uri);
            println!("📋 Enter code: {}", grant.user_code);
            println!("⏳ Waiting for authorization...");
        })
        .await?;

    match source {
        TokenSource::Cache => println!("✅ Using cached token"),
        TokenSource::DeviceFlow => println!("✅ Login successful"),
    }

    if call_api {
        call(&client, &config.api_url, &token).await?;
    }
    Ok(())
}

/// Handle `oathbridge call`.
pub async fn handle_call(config: &BridgeConfig) -> Result<()> {
    let cache = FileTokenCache::new(&config.token_path);
    let token = cached_token(&cache, github::PROVIDER)
        .ok_or_else(|| BridgeError::NotLoggedIn(github::PROVIDER.to_string()))?;
    let client = build_client(config.http_timeout)?;
    call(&client, &config.api_url, &token).await
}

/// Cached token, unless it belongs to another provider.
fn cached_token(cache: &dyn TokenCache, provider: &str) -> Option<AccessToken> {
    cache.load().filter(|token| token.provider == provider)
}

async fn call(client: &reqwest::Client, url: &str, token: &AccessToken) -> Result<()> {
    let credential = BearerCredential::new(token.provider.clone(), token.secret());
    let output = ApiClient::new(client.clone()).get_text(url, &credential).await?;
    tracing::info!(url, "called API");
    println!("{output}");
    Ok(())
}

/// Handle `oathbridge status`.
pub fn handle_status(config: &BridgeConfig) -> Result<()> {
    let cache = FileTokenCache::new(&config.token_path);
    println!("🔐 Token cache: {}", cache.path().display());
    match cache.load() {
        Some(token) => {
            let issued = token
                .issued_at
                .map(|at| format!(" (issued {})", at.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default();
            println!("  {}: ✅ {}{issued}", token.provider, token.redacted());
            if let Some(scopes) = &token.scopes {
                println!("  scopes: {}", scopes.join(", "));
            }
        }
        None => println!("  ❌ Not logged in"),
    }
    Ok(())
}

/// Handle `oathbridge logout`.
pub fn handle_logout(config: &BridgeConfig) -> Result<()> {
    let cache = FileTokenCache::new(&config.token_path);
    let had_token = cache.load().is_some();
    cache.clear()?;
    if had_token {
        println!("✅ Removed cached token");
    } else {
        println!("Nothing to remove");
    }
    Ok(())
}
