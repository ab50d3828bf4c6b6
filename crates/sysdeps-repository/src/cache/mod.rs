//! Bounded, time-expiring caches for parsed descriptor data

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysdeps_core::Coordinate;

/// Property table of one descriptor
pub type PropertyTable = IndexMap<String, String>;

/// When an entry's time-to-live starts counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// TTL restarts on every successful read
    AfterAccess,
    /// TTL counts from the last insert
    AfterWrite,
}

/// Size and expiry limits of one cache
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub max_entries: usize,
    pub ttl: Duration,
    pub expiry: Expiry,
}

impl CachePolicy {
    pub fn new(max_entries: usize, ttl: Duration, expiry: Expiry) -> Self {
        Self {
            max_entries,
            ttl,
            expiry,
        }
    }
}

/// Limits for the four descriptor caches
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub coordinates: usize,
    pub dependency_management: usize,
    pub dependencies: usize,
    pub properties: usize,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            coordinates: 1000,
            dependency_management: 500,
            dependencies: 2000,
            properties: 1000,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    touched_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        let now = Instant::now();
        Self {
            value,
            stored_at: now,
            touched_at: now,
        }
    }

    fn is_expired(&self, policy: &CachePolicy) -> bool {
        let since = match policy.expiry {
            Expiry::AfterAccess => self.touched_at,
            Expiry::AfterWrite => self.stored_at,
        };
        since.elapsed() >= policy.ttl
    }
}

/// One bounded cache keyed by descriptor path
#[derive(Debug)]
pub struct BoundedCache<V> {
    name: &'static str,
    entries: DashMap<PathBuf, CacheEntry<V>>,
    policy: CachePolicy,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone> BoundedCache<V> {
    pub fn new(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get a cached value if it has not expired
    pub fn get(&self, key: &Path) -> Option<V> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired(&self.policy) {
                entry.touched_at = Instant::now();
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        self.entries
            .remove_if(key, |_, entry| entry.is_expired(&self.policy));
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value, evicting the least recently touched entry when full
    pub fn insert(&self, key: PathBuf, value: V) {
        if self.policy.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.policy.max_entries {
            self.cleanup();
            if self.entries.len() >= self.policy.max_entries {
                self.evict_one();
            }
        }
        self.entries.insert(key, CacheEntry::new(value));
    }

    fn evict_one(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.touched_at)
            .map(|entry| entry.key().clone());
        if let Some(victim) = victim {
            if self.entries.remove(&victim).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(&self.policy) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name,
            entries: self.entries.len(),
            max_entries: self.policy.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub name: &'static str,
    /// Number of live entries
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Statistics for all four descriptor caches
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorCacheStats {
    pub coordinates: CacheStats,
    pub dependency_management: CacheStats,
    pub dependencies: CacheStats,
    pub properties: CacheStats,
}

impl DescriptorCacheStats {
    pub fn all(&self) -> [&CacheStats; 4] {
        [
            &self.coordinates,
            &self.dependency_management,
            &self.dependencies,
            &self.properties,
        ]
    }
}

/// Parsed descriptor data shared by every parser in the process
#[derive(Debug)]
pub struct DescriptorCache {
    coordinates: BoundedCache<Coordinate>,
    dependency_management: BoundedCache<Arc<Vec<Coordinate>>>,
    dependencies: BoundedCache<Arc<Vec<Coordinate>>>,
    properties: BoundedCache<Arc<PropertyTable>>,
}

impl DescriptorCache {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            coordinates: BoundedCache::new(
                "coordinates",
                CachePolicy::new(settings.coordinates, settings.ttl, Expiry::AfterAccess),
            ),
            dependency_management: BoundedCache::new(
                "dependency_management",
                CachePolicy::new(
                    settings.dependency_management,
                    settings.ttl,
                    Expiry::AfterWrite,
                ),
            ),
            dependencies: BoundedCache::new(
                "dependencies",
                CachePolicy::new(settings.dependencies, settings.ttl, Expiry::AfterWrite),
            ),
            properties: BoundedCache::new(
                "properties",
                CachePolicy::new(settings.properties, settings.ttl, Expiry::AfterWrite),
            ),
        }
    }

    pub fn coordinate(&self, path: &Path) -> Option<Coordinate> {
        self.coordinates.get(path)
    }

    pub fn put_coordinate(&self, path: &Path, coordinate: Coordinate) {
        self.coordinates.insert(path.to_path_buf(), coordinate);
    }

    pub fn dependency_management(&self, path: &Path) -> Option<Arc<Vec<Coordinate>>> {
        self.dependency_management.get(path)
    }

    pub fn put_dependency_management(&self, path: &Path, managed: Arc<Vec<Coordinate>>) {
        // Empty lists are intentionally not cached; such descriptors are re-parsed on every lookup.
        if managed.is_empty() {
            return;
        }
        self.dependency_management.insert(path.to_path_buf(), managed);
    }

    pub fn dependencies(&self, path: &Path) -> Option<Arc<Vec<Coordinate>>> {
        self.dependencies.get(path)
    }

    pub fn put_dependencies(&self, path: &Path, dependencies: Arc<Vec<Coordinate>>) {
        // Intentionally skipped when empty, same as dependency management.
        if dependencies.is_empty() {
            return;
        }
        self.dependencies.insert(path.to_path_buf(), dependencies);
    }

    pub fn properties(&self, path: &Path) -> Option<Arc<PropertyTable>> {
        self.properties.get(path)
    }

    pub fn put_properties(&self, path: &Path, properties: Arc<PropertyTable>) {
        // Intentionally skipped when empty.
        if properties.is_empty() {
            return;
        }
        self.properties.insert(path.to_path_buf(), properties);
    }

    pub fn stats(&self) -> DescriptorCacheStats {
        DescriptorCacheStats {
            coordinates: self.coordinates.stats(),
            dependency_management: self.dependency_management.stats(),
            dependencies: self.dependencies.stats(),
            properties: self.properties.stats(),
        }
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.coordinates.clear();
        self.dependency_management.clear();
        self.dependencies.clear();
        self.properties.clear();
    }

    /// Remove expired entries from every cache
    pub fn cleanup(&self) -> usize {
        self.coordinates.cleanup()
            + self.dependency_management.cleanup()
            + self.dependencies.cleanup()
            + self.properties.cleanup()
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}
