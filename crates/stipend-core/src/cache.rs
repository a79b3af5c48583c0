//! TTL memoization for repeated report computations
//!
//! Entries are keyed by a SHA-256 digest of the function name and its
//! JSON-encoded arguments. The cache only short-circuits recomputation; a
//! cached value is always the value the wrapped computation returned.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    /// hits / total_requests, 0 before any request
    pub hit_rate: f64,
    /// Entries that have not expired
    pub size: usize,
}

struct Entry<V> {
    func: String,
    stored_at: Instant,
    value: V,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Deterministic key for a call of `func` with `args`
    pub fn key<A: Serialize + ?Sized>(func: &str, args: &A) -> Result<String> {
        let payload = serde_json::json!({
            "func": func,
            "args": serde_json::to_value(args)?,
        });
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&payload)?);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Cached value for the call, if present and fresh
    pub fn get<A: Serialize + ?Sized>(&mut self, func: &str, args: &A) -> Result<Option<V>> {
        let key = Self::key(func, args)?;
        let fresh = match self.entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        };
        match fresh {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        Ok(fresh)
    }

    pub fn insert<A: Serialize + ?Sized>(&mut self, func: &str, args: &A, value: V) -> Result<()> {
        let key = Self::key(func, args)?;
        self.entries.insert(
            key,
            Entry {
                func: func.to_string(),
                stored_at: Instant::now(),
                value,
            },
        );
        Ok(())
    }

    /// Return the cached value or compute and store it
    ///
    /// Errors from `compute` are returned as-is and leave the cache unchanged.
    pub fn get_or_insert_with<A, F>(&mut self, func: &str, args: &A, compute: F) -> Result<V>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(func, args)? {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(func, args, value.clone())?;
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry stored for `func`, returning how many were removed
    pub fn clear_matching(&mut self, func: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.func != func);
        before - self.entries.len()
    }

    pub fn purge_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
    }

    pub fn stats(&self) -> CacheStats {
        let total_requests = self.hits + self.misses;
        let hit_rate = if total_requests > 0 {
            self.hits as f64 / total_requests as f64
        } else {
            0.0
        };
        let size = self
            .entries
            .values()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .count();
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            total_requests,
            hit_rate,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_key_depends_on_name_and_args() {
        let a = TtlCache::<u32>::key("monthly_summary", &("2024-01-01", "2024-03-31")).unwrap();
        let b = TtlCache::<u32>::key("monthly_summary", &("2024-01-01", "2024-03-31")).unwrap();
        let c = TtlCache::<u32>::key("monthly_summary", &("2024-01-01", "2024-04-30")).unwrap();
        let d = TtlCache::<u32>::key("category_breakdown", &("2024-01-01", "2024-03-31")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_get_or_insert_memoizes() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache
                .get_or_insert_with("square", &7, || {
                    calls += 1;
                    Ok(49)
                })
                .unwrap();
            assert_eq!(v, 49);
        }
        assert_eq!(calls, 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_requests, 3);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let err = cache
            .get_or_insert_with("load", &"missing.csv", || {
                Err(Error::InvalidData("boom".into()))
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert_eq!(cache.stats().size, 0);

        let v = cache.get_or_insert_with("load", &"missing.csv", || Ok(5)).unwrap();
        assert_eq!(v, 5);
    }

    #[test]
    fn test_expired_entries_miss() {
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert("f", &1, "value".to_string()).unwrap();
        assert_eq!(cache.get("f", &1).unwrap(), None);
        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_clear_matching_only_drops_named_function() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", &1, 1).unwrap();
        cache.insert("a", &2, 2).unwrap();
        cache.insert("b", &1, 3).unwrap();

        assert_eq!(cache.clear_matching("a"), 2);
        assert_eq!(cache.get("b", &1).unwrap(), Some(3));
        assert_eq!(cache.get("a", &1).unwrap(), None);

        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_fresh_stats() {
        let cache: TtlCache<String> = TtlCache::default();
        let stats = cache.stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.hit_rate, 0.0);
        assert_eq!(cache.ttl(), DEFAULT_TTL);
    }
}
