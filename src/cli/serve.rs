//! CLI handlers for the HTTP servers.

use tokio_util::sync::CancellationToken;

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::server::{echo_router, router, serve};
use crate::session::providers::default_registry;
use crate::util::http::build_client;

/// Handle `oathbridge serve`.
pub async fn handle_serve(config: &BridgeConfig, shutdown: CancellationToken) -> Result<()> {
    let client = build_client(config.http_timeout)?;
    let registry = default_registry(client)?;
    tracing::info!(providers = ?registry.providers(), "session resolvers registered");
    serve(config.resolver_addr, router(registry), shutdown).await
}

/// Handle `oathbridge echo`.
pub async fn handle_echo(config: &BridgeConfig, shutdown: CancellationToken) -> Result<()> {
    serve(config.echo_addr, echo_router(), shutdown).await
}
