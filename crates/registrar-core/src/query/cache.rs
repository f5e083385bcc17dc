//! TTL-bounded query result cache.
//!
//! Entries are keyed by a hash of the whitespace-normalized query text plus
//! the bound parameters. After every insert the cache drops expired entries
//! and, when it holds more than `max_entries`, evicts the oldest fifth by
//! insertion time. That is age-biased eviction, not LRU: reads do not
//! refresh an entry.
//!
//! Payloads are stored serialized. An entry that no longer decodes is
//! dropped and reported as a miss.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use registrar_types::query::{QueryParam, Record};
use tracing::{debug, warn};

use crate::hash::ContentHasher;

/// Default time an entry may be served.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default entry count above which eviction kicks in.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

struct CacheEntry {
    payload: String,
    stored_at: Instant,
    seq: u64,
}

/// Concurrent result cache shared by every session.
pub struct QueryCache<H: ContentHasher> {
    hasher: H,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    next_seq: AtomicU64,
}

impl<H: ContentHasher> QueryCache<H> {
    pub fn new(hasher: H, ttl: Duration, max_entries: usize) -> Self {
        Self {
            hasher,
            entries: DashMap::new(),
            ttl,
            max_entries,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Stable key for a statement and its parameters.
    pub fn key(&self, query: &str, params: &[QueryParam]) -> String {
        let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let params = serde_json::to_string(params).unwrap_or_default();
        self.hasher.compute_hash(&format!("{normalized}{params}"))
    }

    /// Fetch a fresh entry. Expired or undecodable entries are removed.
    pub fn get(&self, key: &str) -> Option<Vec<Record>> {
        // Copy out before removing: never hold a DashMap guard across a write.
        let (payload, age) = {
            let entry = self.entries.get(key)?;
            (entry.payload.clone(), entry.stored_at.elapsed())
        };

        if age >= self.ttl {
            debug!(key, age_ms = age.as_millis() as u64, "Cache entry expired");
            self.entries.remove(key);
            return None;
        }

        match serde_json::from_str::<Vec<Record>>(&payload) {
            Ok(rows) => Some(rows),
            Err(e) => {
                warn!(key, error = %e, "Dropping unreadable cache entry");
                self.entries.remove(key);
                None
            }
        }
    }

    /// Store rows under `key`, then run cleanup.
    pub fn insert(&self, key: String, rows: &[Record]) {
        let payload = match serde_json::to_string(rows) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Result not cacheable");
                return;
            }
        };
        self.insert_payload(key, payload);
        self.cleanup();
    }

    fn insert_payload(&self, key: String, payload: String) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
                seq,
            },
        );
    }

    /// Drop expired entries, then evict the oldest fifth if over capacity.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        let len = self.entries.len();
        if len <= self.max_entries {
            return;
        }

        let mut by_age: Vec<(Instant, u64, String)> = self
            .entries
            .iter()
            .map(|e| (e.stored_at, e.seq, e.key().clone()))
            .collect();
        by_age.sort();

        let evict = (len / 5).max(1);
        for (_, _, key) in by_age.into_iter().take(evict) {
            self.entries.remove(&key);
        }
        debug!(evicted = evict, remaining = self.entries.len(), "Cache eviction");
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PlainHasher, record};

    fn cache(ttl: Duration, max_entries: usize) -> QueryCache<PlainHasher> {
        QueryCache::new(PlainHasher, ttl, max_entries)
    }

    #[test]
    fn test_key_normalizes_whitespace() {
        let cache = cache(DEFAULT_TTL, DEFAULT_MAX_ENTRIES);
        let params = vec![QueryParam::Text("%Ana%".to_string())];
        let a = cache.key("SELECT  *\n FROM alumnos   WHERE nombre LIKE ?", &params);
        let b = cache.key("SELECT * FROM alumnos WHERE nombre LIKE ?", &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_depends_on_params() {
        let cache = cache(DEFAULT_TTL, DEFAULT_MAX_ENTRIES);
        let a = cache.key("SELECT ?", &[QueryParam::Integer(1)]);
        let b = cache.key("SELECT ?", &[QueryParam::Integer(2)]);
        let c = cache.key("SELECT ?", &[QueryParam::Text("1".to_string())]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fresh_entry_is_served() {
        let cache = cache(DEFAULT_TTL, DEFAULT_MAX_ENTRIES);
        let rows = vec![record(&[("nombre", "Ana")])];
        cache.insert("k".to_string(), &rows);
        assert_eq!(cache.get("k"), Some(rows));
    }

    #[test]
    fn test_expired_entry_is_never_served() {
        let cache = cache(Duration::ZERO, DEFAULT_MAX_ENTRIES);
        cache.insert_payload("k".to_string(), "[]".to_string());
        assert!(cache.get("k").is_none());
        assert!(!cache.contains("k"));
    }

    #[test]
    fn test_unreadable_entry_is_a_miss() {
        let cache = cache(DEFAULT_TTL, DEFAULT_MAX_ENTRIES);
        cache.insert_payload("k".to_string(), "{not json".to_string());
        assert!(cache.get("k").is_none());
        assert!(!cache.contains("k"));
    }

    #[test]
    fn test_cleanup_drops_expired_entries() {
        let cache = cache(Duration::from_millis(20), DEFAULT_MAX_ENTRIES);
        cache.insert("old".to_string(), &[]);
        std::thread::sleep(Duration::from_millis(30));
        cache.insert("new".to_string(), &[]);
        assert!(!cache.contains("old"));
        assert!(cache.contains("new"));
    }

    #[test]
    fn test_over_capacity_evicts_oldest_fifth() {
        let cache = cache(DEFAULT_TTL, 100);
        for i in 0..100 {
            cache.insert(format!("k{i}"), &[]);
        }
        assert_eq!(cache.len(), 100);

        // The 101st entry pushes the cache over capacity: 101 / 5 = 20 evicted.
        cache.insert("k100".to_string(), &[]);
        assert_eq!(cache.len(), 81);
        for i in 0..20 {
            assert!(!cache.contains(&format!("k{i}")), "k{i} should be evicted");
        }
        for i in 20..=100 {
            assert!(cache.contains(&format!("k{i}")), "k{i} should survive");
        }
    }

    #[test]
    fn test_small_cache_evicts_at_least_one() {
        let cache = cache(DEFAULT_TTL, 2);
        cache.insert("a".to_string(), &[]);
        cache.insert("b".to_string(), &[]);
        cache.insert("c".to_string(), &[]);
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_reads_do_not_refresh_age() {
        let cache = cache(DEFAULT_TTL, 2);
        cache.insert("a".to_string(), &[]);
        cache.insert("b".to_string(), &[]);
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), &[]);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_clear() {
        let cache = cache(DEFAULT_TTL, DEFAULT_MAX_ENTRIES);
        cache.insert("a".to_string(), &[]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
