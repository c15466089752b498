//! HTTP surfaces: the session-resolution endpoint consumed by the proxy, and
//! a header echo endpoint standing in for a protected upstream.

pub mod echo;
pub mod resolver;

pub use echo::{echo_router, ProxiedUser};
pub use resolver::router;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::BridgeError;

/// Serve `app` on `addr` until `shutdown` is cancelled.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), BridgeError> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, app, shutdown).await
}

/// Serve `app` on an already bound listener until `shutdown` is cancelled.
pub async fn serve_listener(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), BridgeError> {
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
