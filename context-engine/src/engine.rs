//! Vector construction on top of a term statistics source and shared caches.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::accumulator::CoOccurrenceAccumulator;
use crate::cache::{CacheKey, ContextCache, SharedVector};
use crate::error::Result;
use crate::pmi::{top_by_pmi, CorpusStats, PmiFilter, PmiParams};
use crate::source::{TermStatisticsSource, TERM_FREQUENCY_PREFIX};
use crate::vector::TermVector;

/// Configuration for the context engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed contexts considered by a prediction
    pub max_contexts: usize,
    /// Words considered per context
    pub max_words: usize,
    /// Keeps the analogy score finite when `cos(B, x)` is zero
    pub analogy_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_contexts: 100,
            max_words: 100,
            analogy_epsilon: 0.001,
        }
    }
}

/// Context analytics over an inverted index.
///
/// # Type Parameters
///
/// * `S` - Source of term statistics, shared across request threads
///
/// # Examples
///
/// ```
/// use context_engine::{ContextCache, ContextEngine, EngineConfig, MemoryTermIndex};
///
/// let mut index = MemoryTermIndex::new();
/// index.add_co_occurrence("text", "cat", "feline", 50);
///
/// let engine = ContextEngine::new(index, ContextCache::default(), EngineConfig::default());
/// let vector = engine.simple_vector("text", "cat").unwrap();
/// assert_eq!(vector.weight_of("feline"), 50.0);
/// ```
pub struct ContextEngine<S> {
    source: S,
    cache: ContextCache,
    config: EngineConfig,
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    pub fn new(source: S, cache: ContextCache, config: EngineConfig) -> Self {
        Self {
            source,
            cache,
            config,
        }
    }

    pub fn with_defaults(source: S) -> Self {
        Self::new(source, ContextCache::default(), EngineConfig::default())
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Corpus statistics of `field`, or `None` when the field does not exist.
    pub fn field_statistics(&self, field: &str) -> Result<Option<CorpusStats>> {
        Ok(self
            .source
            .sum_total_term_freq(field)?
            .map(CorpusStats::new))
    }

    /// The field's term frequency table, scanned once on first use.
    pub fn term_frequencies(&self, field: &str) -> Result<Arc<TermVector>> {
        self.cache.term_frequencies(field, || {
            debug!(field, "Building term frequency table");
            CoOccurrenceAccumulator::new(&self.source, field).accumulate_all(TERM_FREQUENCY_PREFIX)
        })
    }

    /// Corpus-wide frequency of `term`, read from the cached table.
    pub fn term_count(&self, field: &str, term: &str) -> Result<f64> {
        Ok(self.term_frequencies(field)?.weight_of(term))
    }

    /// Raw co-occurrence vector of `prefix`, used by similarity, analogy and
    /// odd-one-out.
    ///
    /// Blacklisted prefixes return an empty vector without scanning, and
    /// blacklisted suffixes are left out. A scan slower than the configured
    /// threshold still returns its full result but blacklists the prefix for
    /// later requests.
    #[instrument(name = "ContextEngine::simple_vector", skip(self))]
    pub fn simple_vector(&self, field: &str, prefix: &str) -> Result<Arc<TermVector>> {
        let key = CacheKey::new(field, prefix);
        if let Some(sentinel) = self.cache.blacklisted(&key) {
            debug!("Prefix is blacklisted, skipping scan");
            return Ok(sentinel);
        }

        let start = Instant::now();
        let vector = CoOccurrenceAccumulator::new(&self.source, field)
            .accumulate(prefix, |suffix| self.cache.is_blacklisted(field, suffix))?;
        let elapsed = start.elapsed();

        if elapsed > self.cache.slow_scan_threshold() {
            let elapsed_ms = elapsed.as_millis() as u64;
            warn!(elapsed_ms, "Slow prefix scan, blacklisting prefix");
            self.cache.blacklist(key);
        }

        Ok(Arc::new(vector))
    }

    /// PMI-filtered vector of `prefix`, memoised per field and prefix.
    ///
    /// A freshly built vector is filtered and trimmed to the frontier of its
    /// top `limit` entries before it is cached. Cached vectors are returned as
    /// is, whatever `params` the caller passes.
    #[instrument(name = "ContextEngine::pmi_vector", skip(self, params, stats))]
    pub fn pmi_vector(
        &self,
        field: &str,
        prefix: &str,
        params: &PmiParams,
        stats: CorpusStats,
        limit: usize,
    ) -> Result<SharedVector> {
        let key = CacheKey::new(field, prefix);
        if let Some(vector) = self.cache.vector(&key) {
            return Ok(vector);
        }

        let term_frequencies = self.term_frequencies(field)?;
        let mut vector = CoOccurrenceAccumulator::new(&self.source, field).accumulate_all(prefix)?;
        let scanned = vector.len();

        let removed = PmiFilter::new(params, stats, &term_frequencies).apply(&mut vector);
        top_by_pmi(&mut vector, limit);
        debug!(scanned, removed, kept = vector.len(), "Built PMI vector");

        let shared = Arc::new(RwLock::new(vector));
        self.cache.insert_vector(key, shared.clone());
        Ok(shared)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::error::Result;
    use crate::memory::MemoryTermIndex;
    use crate::source::{TermIter, TermStatisticsSource};

    /// Wraps an index, counting scans and optionally sleeping in each one.
    #[derive(Clone)]
    pub struct CountingSource {
        pub index: Arc<MemoryTermIndex>,
        pub scans: Arc<AtomicUsize>,
        pub delay: Option<Duration>,
    }

    impl CountingSource {
        pub fn new(index: MemoryTermIndex) -> Self {
            Self {
                index: Arc::new(index),
                scans: Arc::new(AtomicUsize::new(0)),
                delay: None,
            }
        }

        pub fn slow(index: MemoryTermIndex, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(index)
            }
        }

        pub fn scan_count(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }
    }

    impl TermStatisticsSource for CountingSource {
        fn sum_total_term_freq(&self, field: &str) -> Result<Option<u64>> {
            self.index.sum_total_term_freq(field)
        }

        fn scan_prefix<'a>(&'a self, field: &str, prefix: &str) -> Result<TermIter<'a>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.index.scan_prefix(field, prefix)
        }
    }

    /// N = 1000 corpus where `cat` and `feline` are strongly associated.
    pub fn cat_index() -> MemoryTermIndex {
        let mut index = MemoryTermIndex::new();
        for (term, tf) in [
            ("cat", 80),
            ("feline", 60),
            ("dog", 120),
            ("the", 400),
            ("purr", 30),
            ("bark", 40),
        ] {
            index.add_term_frequency("text", term, tf);
        }
        for (seed, context, co) in [
            ("cat", "feline", 50),
            ("cat", "the", 20),
            ("cat", "purr", 20),
            ("cat", "_", 5),
            ("feline", "cat", 50),
            ("feline", "purr", 10),
            ("purr", "cat", 20),
            ("purr", "feline", 10),
            ("dog", "bark", 30),
            ("dog", "the", 50),
            ("the", "cat", 20),
            ("the", "dog", 50),
            ("bark", "dog", 30),
        ] {
            index.add_co_occurrence("text", seed, context, co);
        }
        index.set_sum_total_term_freq("text", Some(1000));
        index
    }
}
