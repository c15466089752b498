use std::collections::HashMap;
use std::sync::Arc;

use super::credential::BearerCredential;
use super::error::SessionError;
use super::{CanonicalSession, SessionResolver};

/// Immutable provider-name to resolver table.
///
/// Built once at startup through [`ResolverRegistry::builder`]; cloning
/// shares the same table.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use oathbridge::session::providers::github::GitHubSessionResolver;
/// use oathbridge::session::ResolverRegistry;
///
/// # async fn example() -> Result<(), oathbridge::session::SessionError> {
/// let registry = ResolverRegistry::builder()
///     .register(Arc::new(GitHubSessionResolver::new(reqwest::Client::new())))
///     .build()?;
/// let session = registry.resolve_header("Bearer github gho_abc").await?;
/// println!("{}", session.sub);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResolverRegistry {
    resolvers: Arc<HashMap<String, Arc<dyn SessionResolver>>>,
}

impl ResolverRegistry {
    pub fn builder() -> ResolverRegistryBuilder {
        ResolverRegistryBuilder::default()
    }

    /// Resolve `token` with the resolver registered for `provider`.
    ///
    /// Unknown providers fail without any upstream call.
    pub async fn resolve(
        &self,
        provider: &str,
        token: &str,
    ) -> Result<CanonicalSession, SessionError> {
        let resolver = self
            .resolvers
            .get(provider)
            .ok_or_else(|| SessionError::UnknownProvider(provider.to_string()))?;
        resolver.resolve(token).await
    }

    pub async fn resolve_credential(
        &self,
        credential: &BearerCredential,
    ) -> Result<CanonicalSession, SessionError> {
        self.resolve(&credential.provider, &credential.token).await
    }

    /// Parse an `Authorization` header value, then resolve it.
    pub async fn resolve_header(&self, header: &str) -> Result<CanonicalSession, SessionError> {
        let credential = BearerCredential::parse(header)?;
        self.resolve_credential(&credential).await
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.resolvers.contains_key(provider)
    }

    /// Registered provider keys, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

/// Collects resolvers before freezing them into a [`ResolverRegistry`].
#[derive(Default)]
pub struct ResolverRegistryBuilder {
    resolvers: Vec<Arc<dyn SessionResolver>>,
}

impl ResolverRegistryBuilder {
    pub fn register(mut self, resolver: Arc<dyn SessionResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Freeze the table. Two resolvers claiming one provider key is an error.
    pub fn build(self) -> Result<ResolverRegistry, SessionError> {
        let mut resolvers: HashMap<String, Arc<dyn SessionResolver>> = HashMap::new();
        for resolver in self.resolvers {
            let key = resolver.provider().to_string();
            if resolvers.contains_key(&key) {
                return Err(SessionError::DuplicateProvider(key));
            }
            resolvers.insert(key, resolver);
        }
        Ok(ResolverRegistry {
            resolvers: Arc::new(resolvers),
        })
    }
}
