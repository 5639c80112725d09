//! Single-pass accumulation of a prefix's co-occurring terms.

use crate::error::Result;
use crate::source::{TermStatisticsSource, IGNORED_SUFFIX};
use crate::vector::TermVector;

/// Scans one prefix of one field into a [`TermVector`].
///
/// The accumulator never touches shared caches; callers decide whether the
/// result is cached.
pub struct CoOccurrenceAccumulator<'a, S: ?Sized> {
    source: &'a S,
    field: &'a str,
}

impl<'a, S> CoOccurrenceAccumulator<'a, S>
where
    S: TermStatisticsSource + ?Sized,
{
    pub fn new(source: &'a S, field: &'a str) -> Self {
        Self { source, field }
    }

    /// Accumulate every suffix of `prefix`.
    ///
    /// The reserved `_` bucket is always skipped, as is any suffix for which
    /// `exclude` returns true.
    pub fn accumulate(&self, prefix: &str, exclude: impl Fn(&str) -> bool) -> Result<TermVector> {
        let mut vector = TermVector::new(prefix);

        for entry in self.source.scan_prefix(self.field, prefix)? {
            if entry.term == IGNORED_SUFFIX || exclude(&entry.term) {
                continue;
            }
            vector.add(entry.term, entry.frequency as f64);
        }

        Ok(vector)
    }

    /// Accumulate every suffix of `prefix` except the reserved bucket.
    pub fn accumulate_all(&self, prefix: &str) -> Result<TermVector> {
        self.accumulate(prefix, |_| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTermIndex;

    fn index() -> MemoryTermIndex {
        let mut index = MemoryTermIndex::new();
        index.add_co_occurrence("text", "cat", "feline", 50);
        index.add_co_occurrence("text", "cat", "dog", 10);
        index.add_co_occurrence("text", "cat", "_", 99);
        index.add_co_occurrence("text", "cow", "milk", 4);
        index
    }

    #[test]
    fn accumulates_weights_and_mass() {
        let index = index();
        let vector = CoOccurrenceAccumulator::new(&index, "text")
            .accumulate_all("cat")
            .unwrap();

        assert_eq!(vector.prefix(), "cat");
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.weight_of("feline"), 50.0);
        assert_eq!(vector.total_mass(), 60.0);
    }

    #[test]
    fn ignored_bucket_does_not_count_towards_mass() {
        let index = index();
        let vector = CoOccurrenceAccumulator::new(&index, "text")
            .accumulate_all("cat")
            .unwrap();

        assert!(!vector.contains("_"));
        assert_eq!(vector.total_mass(), 60.0);
    }

    #[test]
    fn excluded_terms_are_skipped() {
        let index = index();
        let vector = CoOccurrenceAccumulator::new(&index, "text")
            .accumulate("cat", |term| term == "dog")
            .unwrap();

        assert_eq!(vector.len(), 1);
        assert_eq!(vector.total_mass(), 50.0);
    }

    #[test]
    fn unknown_prefix_is_empty() {
        let index = index();
        let vector = CoOccurrenceAccumulator::new(&index, "text")
            .accumulate_all("zebra")
            .unwrap();

        assert!(vector.is_empty());
        assert_eq!(vector.total_mass(), 0.0);
    }
}
