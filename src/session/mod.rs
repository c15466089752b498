//! Provider-agnostic authentication sessions.
//!
//! A [`SessionResolver`] turns a raw provider token into a
//! [`CanonicalSession`]; the [`ResolverRegistry`] dispatches on the provider
//! named in the bearer credential. Nothing is cached: every call resolves
//! against the provider again.

pub mod credential;
pub mod error;
pub mod providers;
pub mod registry;

pub use credential::BearerCredential;
pub use error::SessionError;
pub use registry::{ResolverRegistry, ResolverRegistryBuilder};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity handed to the reverse proxy, keyed by a provider-scoped subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSession {
    /// Stable, unique id of the identity within its provider.
    pub sub: String,
    pub extra: SessionExtra,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionExtra {
    pub provider: String,
    pub username: String,
    /// Empty when the provider exposes no email.
    pub email: String,
}

impl CanonicalSession {
    pub fn new(
        sub: impl Into<String>,
        provider: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            sub: sub.into(),
            extra: SessionExtra {
                provider: provider.into(),
                username: username.into(),
                email: email.into(),
            },
        }
    }
}

/// Resolves a provider token into a canonical session.
///
/// Implementations make exactly one upstream call per `resolve` and keep no
/// per-request state, so one instance serves concurrent requests.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Key this resolver is registered under, e.g. `"github"`.
    fn provider(&self) -> &str;

    async fn resolve(&self, token: &str) -> Result<CanonicalSession, SessionError>;
}
