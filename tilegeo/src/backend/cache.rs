//! In-memory partition cache with LRU eviction.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Entry in the partition cache.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Bytes,
    /// Logical access clock for LRU ordering
    last_accessed: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    size_bytes: usize,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionCacheStats {
    pub entries: usize,
    pub size_bytes: usize,
    pub max_size_bytes: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Byte-bounded cache of fetched partition files, keyed by partition id.
///
/// Entries larger than the whole budget are not cached.
pub struct PartitionCache {
    inner: Mutex<Inner>,
    max_size_bytes: usize,
}

impl PartitionCache {
    pub fn new(max_size_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_size_bytes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries stay consistent across a poisoned lock
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get a cached partition, updating recency on hit.
    pub fn get(&self, id: &str) -> Option<Bytes> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let now = inner.tick();
        match inner.entries.get_mut(id) {
            Some(entry) => {
                entry.last_accessed = now;
                let data = entry.data.clone();
                inner.hits += 1;
                Some(data)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Put a partition into the cache, evicting least recently used entries
    /// until it fits.
    pub fn put(&self, id: impl Into<String>, data: Bytes) {
        let size = data.len();
        if size > self.max_size_bytes {
            return;
        }

        let id = id.into();
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some(old) = inner.entries.remove(&id) {
            inner.size_bytes -= old.data.len();
        }

        while inner.size_bytes + size > self.max_size_bytes {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            let Some(key) = oldest else {
                break;
            };
            if let Some(evicted) = inner.entries.remove(&key) {
                inner.size_bytes -= evicted.data.len();
                tracing::trace!(partition = %key, bytes = evicted.data.len(), "Evicted partition");
            }
        }

        let now = inner.tick();
        inner.size_bytes += size;
        inner.entries.insert(
            id,
            CacheEntry {
                data,
                last_accessed: now,
            },
        );
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().entries.contains_key(id)
    }

    pub fn stats(&self) -> PartitionCacheStats {
        let inner = self.lock();
        PartitionCacheStats {
            entries: inner.entries.len(),
            size_bytes: inner.size_bytes,
            max_size_bytes: self.max_size_bytes,
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.size_bytes = 0;
    }
}
