//! Canonical cube identity resolution
//!
//! Some migrations must find the current identity of a dataset that was
//! persisted under an older one. Lookups go through [`IdentityResolver`];
//! [`CachedIdentityResolver`] memoizes them with moka.

use crate::error::ResolverError;
use async_trait::async_trait;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Resolves a cube identity to its latest canonical identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Latest identity of `cube_iri`
    async fn latest_iri(&self, cube_iri: &str) -> Result<String, ResolverError>;
}

/// Resolver that treats every identity as canonical
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

#[async_trait]
impl IdentityResolver for PassthroughResolver {
    async fn latest_iri(&self, cube_iri: &str) -> Result<String, ResolverError> {
        Ok(cube_iri.to_string())
    }
}

/// Resolver backed by a fixed mapping; unmapped identities are canonical
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    mapping: HashMap<String, String>,
}

impl StaticIdentityResolver {
    /// Create from an old -> new mapping
    #[inline]
    #[must_use]
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self { mapping }
    }

    /// Add a mapping
    #[must_use]
    pub fn with(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.mapping.insert(old.into(), new.into());
        self
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn latest_iri(&self, cube_iri: &str) -> Result<String, ResolverError> {
        Ok(self
            .mapping
            .get(cube_iri)
            .cloned()
            .unwrap_or_else(|| cube_iri.to_string()))
    }
}

/// Memoizing wrapper around another resolver
///
/// Concurrent lookups of the same identity share one upstream call.
/// Failed lookups are not cached.
#[derive(Clone)]
pub struct CachedIdentityResolver {
    inner: Arc<dyn IdentityResolver>,
    cache: Cache<String, String>,
}

impl CachedIdentityResolver {
    /// Cache up to `max_capacity` identities
    #[must_use]
    pub fn new(inner: Arc<dyn IdentityResolver>, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
        }
    }

    /// Cache with time-based expiration
    #[must_use]
    pub fn with_ttl(inner: Arc<dyn IdentityResolver>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Number of cached identities
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for CachedIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedIdentityResolver")
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityResolver for CachedIdentityResolver {
    async fn latest_iri(&self, cube_iri: &str) -> Result<String, ResolverError> {
        let inner = Arc::clone(&self.inner);
        let key = cube_iri.to_string();
        self.cache
            .try_get_with(key.clone(), async move { inner.latest_iri(&key).await })
            .await
            .map_err(|e| (*e).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_resolver_maps_known_identities() {
        let resolver = StaticIdentityResolver::default().with("old", "new");
        assert_eq!(resolver.latest_iri("old").await.unwrap(), "new");
        assert_eq!(resolver.latest_iri("other").await.unwrap(), "other");
    }

    #[tokio::test]
    async fn cached_resolver_calls_upstream_once() {
        let mut mock = MockIdentityResolver::new();
        mock.expect_latest_iri()
            .times(1)
            .returning(|iri| Ok(format!("{iri}/v2")));

        let resolver = CachedIdentityResolver::new(Arc::new(mock), 16);
        assert_eq!(resolver.latest_iri("cube").await.unwrap(), "cube/v2");
        assert_eq!(resolver.latest_iri("cube").await.unwrap(), "cube/v2");
    }

    #[tokio::test]
    async fn cached_resolver_does_not_cache_failures() {
        let mut mock = MockIdentityResolver::new();
        mock.expect_latest_iri()
            .times(2)
            .returning(|iri| Err(ResolverError::NotFound(iri.to_string())));

        let resolver = CachedIdentityResolver::new(Arc::new(mock), 16);
        assert!(resolver.latest_iri("cube").await.is_err());
        assert!(resolver.latest_iri("cube").await.is_err());
    }
}
