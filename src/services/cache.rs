use crate::models::SitePopulation;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// In-memory TTL cache for fetched site populations.
///
/// One entry per search term. Keeps the neighbor endpoints from hammering
/// the platform API on every query while a population snapshot is fresh.
pub struct PopulationCache {
    cache: Cache<String, Arc<SitePopulation>>,
    ttl_secs: u64,
}

impl PopulationCache {
    /// Create a new population cache
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache, ttl_secs }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<SitePopulation>> {
        let hit = self.cache.get(key).await;
        if hit.is_some() {
            tracing::trace!("Population cache hit: {}", key);
        } else {
            tracing::trace!("Population cache miss: {}", key);
        }
        hit
    }

    /// Store a fetched population and return the shared handle to it
    pub async fn insert(&self, key: &str, population: SitePopulation) -> Arc<SitePopulation> {
        let value = Arc::new(population);
        self.cache.insert(key.to_string(), Arc::clone(&value)).await;
        tracing::trace!("Population cache set: {} (ttl {}s)", key, self.ttl_secs);
        value
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a site population snapshot
    pub fn sites(search: Option<&str>) -> String {
        match search {
            Some(term) if !term.is_empty() => format!("sites:{}", term.to_lowercase()),
            _ => "sites:all".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SitePopulation;

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = PopulationCache::new(16, 60);
        let key = CacheKey::sites(None);

        assert!(cache.get(&key).await.is_none());

        let population = SitePopulation {
            sites: vec![],
            ungeocoded: vec!["TR-1001".to_string()],
        };
        cache.insert(&key, population).await;

        let hit = cache.get(&key).await.expect("expected a cache hit");
        assert_eq!(hit.ungeocoded, vec!["TR-1001"]);

        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_stats_reports_ttl() {
        let cache = PopulationCache::new(16, 300);
        assert_eq!(cache.stats().ttl_secs, 300);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::sites(None), "sites:all");
        assert_eq!(CacheKey::sites(Some("")), "sites:all");
        assert_eq!(CacheKey::sites(Some("TR-10")), "sites:tr-10");
    }
}
