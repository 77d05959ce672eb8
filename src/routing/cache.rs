//! Memoized routes keyed by endpoints and quality tier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{EdgePath, PathQuality};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    pub ttl_ms: f64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 30_000.0,
            max_entries: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub target: String,
    pub quality: PathQuality,
}

impl CacheKey {
    pub fn new(source: &str, target: &str, quality: PathQuality) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            quality,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[derive(Debug, Clone)]
pub struct CachedPathResult {
    pub result: EdgePath,
    pub timestamp: f64,
    pub grid_version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub grid_version: u64,
}

#[derive(Debug, Default)]
pub struct PathfindingCache {
    config: CacheConfig,
    entries: HashMap<CacheKey, CachedPathResult>,
    hits: u64,
    misses: u64,
}

impl PathfindingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the stored route only while it was computed against
    /// `grid_version` and is younger than the TTL. Stale entries are dropped.
    pub fn get(&mut self, key: &CacheKey, grid_version: u64, now_ms: f64) -> Option<EdgePath> {
        let fresh = match self.entries.get(key) {
            Some(entry) => {
                entry.grid_version == grid_version && now_ms - entry.timestamp < self.config.ttl_ms
            }
            None => {
                self.misses += 1;
                return None;
            }
        };

        if !fresh {
            self.entries.remove(key);
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.entries.get(key).map(|entry| entry.result.clone())
    }

    pub fn insert(&mut self, key: CacheKey, result: EdgePath, grid_version: u64, now_ms: f64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CachedPathResult {
                result,
                timestamp: now_ms,
                grid_version,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by(|a, b| a.1.timestamp.total_cmp(&b.1.timestamp))
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            tracing::debug!(source = %key.source, target = %key.target, "evicting oldest cached route");
            self.entries.remove(&key);
        }
    }

    /// Drop every entry whose source or target is exactly `node_id`.
    pub fn invalidate_node(&mut self, node_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.touches(node_id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self, grid_version: u64) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            grid_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;

    fn route() -> EdgePath {
        EdgePath {
            waypoints: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            found: true,
            cost: 1.0,
            debug: None,
        }
    }

    fn key(source: &str, target: &str) -> CacheKey {
        CacheKey::new(source, target, PathQuality::Balanced)
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = PathfindingCache::default();
        assert!(cache.get(&key("a", "b"), 1, 0.0).is_none());

        cache.insert(key("a", "b"), route(), 1, 0.0);
        assert_eq!(cache.get(&key("a", "b"), 1, 10.0), Some(route()));

        let stats = cache.stats(1);
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_quality_is_part_of_key() {
        let mut cache = PathfindingCache::default();
        cache.insert(key("a", "b"), route(), 1, 0.0);
        let fast = CacheKey::new("a", "b", PathQuality::Fast);
        assert!(cache.get(&fast, 1, 0.0).is_none());
    }

    #[test]
    fn test_version_mismatch_is_miss() {
        let mut cache = PathfindingCache::default();
        cache.insert(key("a", "b"), route(), 1, 0.0);
        assert!(cache.get(&key("a", "b"), 2, 0.0).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_expiry() {
        let mut cache = PathfindingCache::default();
        cache.insert(key("a", "b"), route(), 1, 0.0);
        assert!(cache.get(&key("a", "b"), 1, 29_999.0).is_some());
        assert!(cache.get(&key("a", "b"), 1, 30_000.0).is_none());
    }

    #[test]
    fn test_invalidate_node_uses_exact_ids() {
        let mut cache = PathfindingCache::default();
        cache.insert(key("1", "2"), route(), 1, 0.0);
        cache.insert(key("10", "20"), route(), 1, 0.0);
        cache.insert(key("3", "1"), route(), 1, 0.0);
        cache.insert(key("a-1", "b"), route(), 1, 0.0);

        assert_eq!(cache.invalidate_node("1"), 2);
        assert!(cache.get(&key("10", "20"), 1, 0.0).is_some());
        assert!(cache.get(&key("a-1", "b"), 1, 0.0).is_some());
        assert!(cache.get(&key("1", "2"), 1, 0.0).is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut cache = PathfindingCache::new(CacheConfig {
            ttl_ms: 30_000.0,
            max_entries: 2,
        });
        cache.insert(key("a", "b"), route(), 1, 0.0);
        cache.insert(key("b", "c"), route(), 1, 5.0);
        cache.insert(key("c", "d"), route(), 1, 10.0);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a", "b"), 1, 10.0).is_none());
        assert!(cache.get(&key("c", "d"), 1, 10.0).is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = PathfindingCache::default();
        cache.insert(key("a", "b"), route(), 1, 0.0);
        cache.clear();
        assert!(cache.is_empty());
    }
}
