//! Bounded caches shared by every request against the engine.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::{ContextError, Result};
use crate::vector::TermVector;

/// A PMI vector shared between requests. The frontier trim mutates it.
pub type SharedVector = Arc<RwLock<TermVector>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub field: String,
    pub prefix: String,
}

impl CacheKey {
    pub fn new(field: &str, prefix: &str) -> Self {
        Self {
            field: field.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of memoised PMI vectors
    pub memo_capacity: u64,
    /// Maximum number of blacklisted prefixes
    pub blacklist_capacity: u64,
    /// A raw scan slower than this blacklists its prefix
    pub slow_scan_threshold: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memo_capacity: 200_000,
            blacklist_capacity: 10_000,
            slow_scan_threshold: Duration::from_secs(5),
        }
    }
}

/// Entry counts, as reported by the cache admin endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub blacklisted_prefixes: u64,
    pub pmi_vectors: u64,
    pub term_frequency_tables: u64,
}

/// Slow-prefix blacklist, memoised PMI vectors and per-field term
/// frequency tables.
///
/// Entries are never invalidated by index changes; [`ContextCache::clear`]
/// is the only way to drop them.
#[derive(Clone)]
pub struct ContextCache {
    config: CacheConfig,
    blacklist: Cache<CacheKey, Arc<TermVector>>,
    vectors: Cache<CacheKey, SharedVector>,
    term_frequencies: Cache<String, Arc<TermVector>>,
}

impl ContextCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            blacklist: Cache::builder()
                .max_capacity(config.blacklist_capacity)
                .build(),
            vectors: Cache::builder().max_capacity(config.memo_capacity).build(),
            // One table per field; fields are few
            term_frequencies: Cache::builder().max_capacity(1_024).build(),
            config,
        }
    }

    pub fn slow_scan_threshold(&self) -> Duration {
        self.config.slow_scan_threshold
    }

    /// Empty sentinel vector for a blacklisted prefix.
    pub fn blacklisted(&self, key: &CacheKey) -> Option<Arc<TermVector>> {
        self.blacklist.get(key)
    }

    pub fn is_blacklisted(&self, field: &str, prefix: &str) -> bool {
        self.blacklist.contains_key(&CacheKey::new(field, prefix))
    }

    pub fn blacklist(&self, key: CacheKey) {
        let sentinel = Arc::new(TermVector::new(key.prefix.clone()));
        self.blacklist.insert(key, sentinel);
    }

    pub fn vector(&self, key: &CacheKey) -> Option<SharedVector> {
        self.vectors.get(key)
    }

    /// Racing first populations of the same key are fine; the last writer wins.
    pub fn insert_vector(&self, key: CacheKey, vector: SharedVector) {
        self.vectors.insert(key, vector);
    }

    /// The field's term frequency table, built by `init` on first use.
    ///
    /// Concurrent callers for the same field wait for a single
    /// initialisation. A failed initialisation is not cached.
    pub fn term_frequencies<F>(&self, field: &str, init: F) -> Result<Arc<TermVector>>
    where
        F: FnOnce() -> Result<TermVector>,
    {
        self.term_frequencies
            .try_get_with(field.to_string(), || init().map(Arc::new))
            .map_err(|err: Arc<ContextError>| (*err).clone())
    }

    pub fn stats(&self) -> CacheStats {
        self.blacklist.run_pending_tasks();
        self.vectors.run_pending_tasks();
        self.term_frequencies.run_pending_tasks();

        CacheStats {
            blacklisted_prefixes: self.blacklist.entry_count(),
            pmi_vectors: self.vectors.entry_count(),
            term_frequency_tables: self.term_frequencies.entry_count(),
        }
    }

    /// Drop every entry. Returns the counts observed just before clearing.
    pub fn clear(&self) -> CacheStats {
        let before = self.stats();
        self.blacklist.invalidate_all();
        self.vectors.invalidate_all();
        self.term_frequencies.invalidate_all();
        before
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn blacklist_holds_empty_sentinel() {
        let cache = ContextCache::default();
        let key = CacheKey::new("text", "the");
        cache.blacklist(key.clone());

        let sentinel = cache.blacklisted(&key).unwrap();
        assert!(sentinel.is_empty());
        assert_eq!(sentinel.prefix(), "the");
        assert!(cache.is_blacklisted("text", "the"));
        assert!(!cache.is_blacklisted("title", "the"));
    }

    #[test]
    fn term_frequencies_initialise_once() {
        let cache = ContextCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let table = cache
                .term_frequencies("text", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(TermVector::from_weights("__tf__", [("cat", 80.0)]))
                })
                .unwrap();
            assert_eq!(table.weight_of("cat"), 80.0);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_initialisation_is_retried() {
        let cache = ContextCache::default();

        let err = cache
            .term_frequencies("text", || Err(ContextError::corpus_state("text")))
            .unwrap_err();
        assert!(matches!(err, ContextError::CorpusState { .. }));

        let table = cache
            .term_frequencies("text", || Ok(TermVector::new("__tf__")))
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn clear_reports_and_drops_entries() {
        let cache = ContextCache::default();
        cache.blacklist(CacheKey::new("text", "the"));
        cache.insert_vector(
            CacheKey::new("text", "cat"),
            Arc::new(RwLock::new(TermVector::new("cat"))),
        );
        cache
            .term_frequencies("text", || Ok(TermVector::new("__tf__")))
            .unwrap();

        let before = cache.clear();
        assert_eq!(
            before,
            CacheStats {
                blacklisted_prefixes: 1,
                pmi_vectors: 1,
                term_frequency_tables: 1,
            }
        );
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
