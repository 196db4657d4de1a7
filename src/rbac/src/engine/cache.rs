//! Effective-permission cache keyed by normalized role sets

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{PermissionId, RoleId};

/// Sorted, deduplicated role tuple
pub(crate) type CacheKey = Vec<RoleId>;

/// Shared, immutable effective permission set
pub type PermissionSet = Arc<BTreeSet<PermissionId>>;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of distinct role sets kept
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

/// Role set -> effective permissions
///
/// Concurrent callers may race to fill the same key. Recomputation is
/// idempotent, so whichever insert lands first is kept. Entries never expire:
/// the model behind them is frozen.
pub struct PermissionCache {
    entries: DashMap<CacheKey, PermissionSet>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PermissionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: config.capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, key: &[RoleId]) -> Option<PermissionSet> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert if absent. Returns the set now stored under `key`, or `value`
    /// itself when the cache is full.
    pub(crate) fn insert(&self, key: CacheKey, value: PermissionSet) -> PermissionSet {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            return value;
        }

        Arc::clone(self.entries.entry(key).or_insert(value).value())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
