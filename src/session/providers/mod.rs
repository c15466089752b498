//! Identity-provider adapters implementing [`SessionResolver`](super::SessionResolver).

#[cfg(feature = "github")]
pub mod github;

use super::{ResolverRegistry, SessionError};

/// Registry holding every adapter compiled into this build.
#[cfg_attr(not(feature = "github"), allow(unused_variables))]
pub fn default_registry(client: reqwest::Client) -> Result<ResolverRegistry, SessionError> {
    #[allow(unused_mut)]
    let mut builder = ResolverRegistry::builder();
    #[cfg(feature = "github")]
    {
        builder = builder.register(std::sync::Arc::new(github::GitHubSessionResolver::new(
            client,
        )));
    }
    builder.build()
}
