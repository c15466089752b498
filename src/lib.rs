//! oathbridge: bridge external OAuth identities into proxy sessions
//!
//! Two halves share this crate:
//!
//! - **Client side**: the OAuth 2.0 device authorization grant
//!   ([`auth`]), turning a user-entered code into a long-lived access token,
//!   with a best-effort local token cache and an authenticated caller
//!   ([`client`]) for APIs behind the proxy.
//! - **Server side**: a [`session::ResolverRegistry`] mapping
//!   `Authorization: Bearer <provider> <token>` to a provider-agnostic
//!   [`session::CanonicalSession`], served over HTTP by [`server`].
//!
//! # Quick Start
//!
//! ```no_run
//! use oathbridge::server;
//! use oathbridge::session::providers::default_registry;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> oathbridge::error::Result<()> {
//! let registry = default_registry(reqwest::Client::new())?;
//! let addr = "0.0.0.0:3001".parse().expect("valid address");
//! server::serve(addr, server::router(registry), CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
