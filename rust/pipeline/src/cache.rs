// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry cache.
//!
//! Cut solids are expensive to build and repeat across parts: the same
//! hole on the same profile family always produces the same solid. The
//! cache keys on a 32-bit fingerprint of (kind, profile dimensions,
//! parameters) and bounds itself by bytes, entry count and age.
//!
//! Entries are owned clones; callers always receive clones, never shared
//! references into the store. All public operations are atomic with
//! respect to the pipeline: `get_or_create` holds the lock across the
//! factory call, so one fingerprint builds at most once even under
//! concurrent callers.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use steelfab_core::{Feature, SteelProfile};
use steelfab_geometry::Mesh;
use tracing::debug;

/// Cache configuration
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Upper bound on stored attribute bytes
    pub max_bytes: usize,
    /// Upper bound on entry count
    pub max_entries: usize,
    /// Entry time-to-live
    pub ttl: Duration,
    /// Interval between opportunistic expiry sweeps
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            max_entries: 1000,
            ttl: Duration::from_millis(300_000),
            cleanup_interval: Duration::from_millis(60_000),
        }
    }
}

/// One stored solid
struct CacheEntry {
    mesh: Mesh,
    last_accessed: Instant,
    access_count: u64,
    byte_size: usize,
}

/// Monotone counters and a snapshot of the store
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

struct CacheInner {
    entries: FxHashMap<u32, CacheEntry>,
    current_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    last_sweep: Instant,
}

/// Bounded LRU + TTL cache for cut solids
pub struct GeometryCache {
    config: CacheConfig,
    inner: Mutex<CacheInner>,
}

impl GeometryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CacheInner {
                entries: FxHashMap::default(),
                current_bytes: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Fingerprint of (kind, profile dimensions, params): the cache key.
    ///
    /// A 32-bit rolling hash folded from FxHasher; floats hash by bit
    /// pattern so equal inputs always collide onto the same key.
    pub fn fingerprint(feature: &Feature, profile: &SteelProfile) -> u32 {
        let mut hasher = rustc_hash::FxHasher::default();

        feature.kind.as_str().hash(&mut hasher);

        let dims = &profile.dimensions;
        for value in [
            dims.length,
            dims.height,
            dims.width,
            dims.thickness,
            dims.web_thickness.unwrap_or(0.0),
            dims.flange_thickness.unwrap_or(0.0),
            dims.wall_thickness.unwrap_or(0.0),
        ] {
            value.to_bits().hash(&mut hasher);
        }

        // Parameters hash through their canonical serialization; unknown
        // keys participate so vendor extensions differentiate entries
        if let Ok(params) = serde_json::to_string(&feature.params) {
            params.hash(&mut hasher);
        }
        for value in feature.position {
            value.to_bits().hash(&mut hasher);
        }
        if let Some(face) = feature.face {
            face.as_str().hash(&mut hasher);
        }

        let full = hasher.finish();
        (full ^ (full >> 32)) as u32
    }

    /// Look up a solid; returns an owned clone
    pub fn get(&self, key: u32) -> Option<Mesh> {
        let mut inner = self.inner.lock().expect("cache poisoned");
        self.sweep_if_due(&mut inner);

        match inner.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_accessed = Instant::now();
                entry.access_count += 1;
                let mesh = entry.mesh.clone();
                inner.hits += 1;
                Some(mesh)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Store a solid (clones on insert). Oversized solids are silently
    /// not cached.
    pub fn set(&self, key: u32, mesh: &Mesh) {
        let byte_size = mesh.byte_size();
        if byte_size > self.config.max_bytes {
            debug!(key, byte_size, "solid exceeds the cache budget, not cached");
            return;
        }

        let mut inner = self.inner.lock().expect("cache poisoned");
        self.insert_locked(&mut inner, key, mesh.clone(), byte_size);
    }

    /// Fetch or build: the factory runs at most once per fingerprint.
    pub fn get_or_create<F>(&self, key: u32, factory: F) -> crate::error::Result<Mesh>
    where
        F: FnOnce() -> crate::error::Result<Mesh>,
    {
        let mut inner = self.inner.lock().expect("cache poisoned");
        self.sweep_if_due(&mut inner);

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.last_accessed = Instant::now();
            entry.access_count += 1;
            let mesh = entry.mesh.clone();
            inner.hits += 1;
            return Ok(mesh);
        }
        inner.misses += 1;

        // Build while holding the lock: concurrent callers for the same
        // fingerprint wait here instead of duplicating the work
        let mesh = factory()?;
        let byte_size = mesh.byte_size();
        if byte_size <= self.config.max_bytes {
            self.insert_locked(&mut inner, key, mesh.clone(), byte_size);
        }
        Ok(mesh)
    }

    /// Remove one entry
    pub fn remove(&self, key: u32) {
        let mut inner = self.inner.lock().expect("cache poisoned");
        if let Some(entry) = inner.entries.remove(&key) {
            inner.current_bytes -= entry.byte_size;
        }
    }

    /// Drop everything
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache poisoned");
        inner.entries.clear();
        inner.current_bytes = 0;
    }

    /// Purge entries whose access count falls below 25% of the mean
    pub fn optimize(&self) {
        let mut inner = self.inner.lock().expect("cache poisoned");
        if inner.entries.is_empty() {
            return;
        }

        let mean = inner
            .entries
            .values()
            .map(|e| e.access_count as f64)
            .sum::<f64>()
            / inner.entries.len() as f64;
        let threshold = mean * 0.25;

        let cold: Vec<u32> = inner
            .entries
            .iter()
            .filter(|(_, e)| (e.access_count as f64) < threshold)
            .map(|(&k, _)| k)
            .collect();

        for key in cold {
            if let Some(entry) = inner.entries.remove(&key) {
                inner.current_bytes -= entry.byte_size;
                inner.evictions += 1;
            }
        }
    }

    /// Evict entries older than the TTL
    pub fn sweep_expired(&self) {
        let mut inner = self.inner.lock().expect("cache poisoned");
        self.sweep_locked(&mut inner);
    }

    /// Counters and occupancy snapshot
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache poisoned");
        let total = inner.hits + inner.misses;
        CacheStats {
            entries: inner.entries.len(),
            bytes: inner.current_bytes,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            hit_rate: if total > 0 {
                inner.hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    fn insert_locked(&self, inner: &mut CacheInner, key: u32, mesh: Mesh, byte_size: usize) {
        // Replacing an entry releases its bytes first
        if let Some(old) = inner.entries.remove(&key) {
            inner.current_bytes -= old.byte_size;
        }

        // Strict LRU until the new entry fits
        while !inner.entries.is_empty()
            && (inner.current_bytes + byte_size > self.config.max_bytes
                || inner.entries.len() + 1 > self.config.max_entries)
        {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(&k, _)| k);
            match oldest {
                Some(k) => {
                    if let Some(evicted) = inner.entries.remove(&k) {
                        inner.current_bytes -= evicted.byte_size;
                        inner.evictions += 1;
                    }
                }
                None => break,
            }
        }

        inner.current_bytes += byte_size;
        inner.entries.insert(
            key,
            CacheEntry {
                mesh,
                last_accessed: Instant::now(),
                access_count: 1,
                byte_size,
            },
        );
    }

    fn sweep_if_due(&self, inner: &mut CacheInner) {
        if inner.last_sweep.elapsed() >= self.config.cleanup_interval {
            self.sweep_locked(inner);
        }
    }

    fn sweep_locked(&self, inner: &mut CacheInner) {
        inner.last_sweep = Instant::now();

        let expired: Vec<u32> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.last_accessed.elapsed() >= self.config.ttl)
            .map(|(&k, _)| k)
            .collect();

        for key in expired {
            if let Some(entry) = inner.entries.remove(&key) {
                inner.current_bytes -= entry.byte_size;
                inner.evictions += 1;
            }
        }
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Optional process-wide cache slot, init-on-first-use
static DEFAULT_CACHE: Mutex<Option<std::sync::Arc<GeometryCache>>> = Mutex::new(None);

/// Shared default cache, created on first use
pub fn default_cache() -> std::sync::Arc<GeometryCache> {
    let mut slot = DEFAULT_CACHE.lock().expect("default cache poisoned");
    slot.get_or_insert_with(|| std::sync::Arc::new(GeometryCache::default()))
        .clone()
}

/// Explicit teardown of the default cache; existing handles stay valid
pub fn teardown_default_cache() {
    let mut slot = DEFAULT_CACHE.lock().expect("default cache poisoned");
    *slot = None;
}
