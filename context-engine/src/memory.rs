//! In-memory term statistics backed by one sorted map per field.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use crate::error::{ContextError, Result};
use crate::source::{
    compound_term, TermFrequency, TermIter, TermStatisticsSource, TERM_FREQUENCY_PREFIX,
};

#[derive(Debug, Clone, Default)]
struct FieldTerms {
    terms: BTreeMap<String, u64>,
    /// `None` marks the statistic as unavailable.
    sum_total_term_freq: Option<u64>,
}

/// Term statistics held in memory.
///
/// # Examples
///
/// ```
/// use context_engine::{MemoryTermIndex, TermStatisticsSource};
///
/// let mut index = MemoryTermIndex::new();
/// index.add_co_occurrence("text", "cat", "feline", 50);
/// index.add_term_frequency("text", "cat", 80);
///
/// let contexts: Vec<_> = index.scan_prefix("text", "cat").unwrap().collect();
/// assert_eq!(contexts[0].term, "feline");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTermIndex {
    fields: HashMap<String, FieldTerms>,
}

impl MemoryTermIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `frequency` occurrences of a raw indexed term.
    pub fn add_term(&mut self, field: &str, term: impl Into<String>, frequency: u64) {
        let field_terms = self.fields.entry(field.to_string()).or_insert_with(|| FieldTerms {
            terms: BTreeMap::new(),
            sum_total_term_freq: Some(0),
        });
        *field_terms.terms.entry(term.into()).or_insert(0) += frequency;
        if let Some(total) = field_terms.sum_total_term_freq.as_mut() {
            *total += frequency;
        }
    }

    /// Record that `context` appeared near `seed` `frequency` times.
    pub fn add_co_occurrence(&mut self, field: &str, seed: &str, context: &str, frequency: u64) {
        self.add_term(field, compound_term(seed, context), frequency);
    }

    /// Record the corpus-wide frequency of `term`.
    pub fn add_term_frequency(&mut self, field: &str, term: &str, frequency: u64) {
        self.add_term(field, compound_term(TERM_FREQUENCY_PREFIX, term), frequency);
    }

    /// Override the field's total term frequency. `None` makes it unavailable.
    pub fn set_sum_total_term_freq(&mut self, field: &str, total: Option<u64>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .sum_total_term_freq = total;
    }
}

impl TermStatisticsSource for MemoryTermIndex {
    fn sum_total_term_freq(&self, field: &str) -> Result<Option<u64>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(field_terms) => field_terms
                .sum_total_term_freq
                .map(Some)
                .ok_or_else(|| ContextError::corpus_state(field)),
        }
    }

    fn scan_prefix<'a>(&'a self, field: &str, prefix: &str) -> Result<TermIter<'a>> {
        let Some(field_terms) = self.fields.get(field) else {
            return Ok(Box::new(std::iter::empty()));
        };

        // Seek to the first term at or after `prefix:` and stop at the first miss
        let start = compound_term(prefix, "");
        let offset = start.len();
        let range = field_terms
            .terms
            .range::<str, _>((Bound::Included(start.as_str()), Bound::Unbounded));

        Ok(Box::new(
            range
                .take_while(move |(term, _)| term.starts_with(start.as_str()))
                .map(move |(term, frequency)| TermFrequency::new(&term[offset..], *frequency)),
        ))
    }

    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        let key = compound_term(TERM_FREQUENCY_PREFIX, term);
        Ok(self
            .fields
            .get(field)
            .and_then(|f| f.terms.get(&key))
            .copied()
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MemoryTermIndex {
        let mut index = MemoryTermIndex::new();
        index.add_co_occurrence("text", "cat", "feline", 50);
        index.add_co_occurrence("text", "cat", "dog", 7);
        index.add_co_occurrence("text", "catalog", "book", 3);
        index.add_co_occurrence("text", "dog", "cat", 7);
        index.add_term_frequency("text", "cat", 80);
        index
    }

    #[test]
    fn scan_prefix_stops_at_prefix_boundary() {
        let index = sample_index();

        let terms: Vec<_> = index.scan_prefix("text", "cat").unwrap().collect();
        assert_eq!(
            terms,
            vec![
                TermFrequency::new("dog", 7),
                TermFrequency::new("feline", 50),
            ]
        );
    }

    #[test]
    fn scan_prefix_on_missing_field_is_empty() {
        let index = sample_index();
        assert_eq!(index.scan_prefix("other", "cat").unwrap().count(), 0);
    }

    #[test]
    fn repeated_adds_accumulate() {
        let mut index = sample_index();
        index.add_co_occurrence("text", "cat", "feline", 5);

        let feline = index
            .scan_prefix("text", "cat")
            .unwrap()
            .find(|t| t.term == "feline")
            .unwrap();
        assert_eq!(feline.frequency, 55);
    }

    #[test]
    fn sum_total_term_freq_tracks_additions() {
        let index = sample_index();
        assert_eq!(index.sum_total_term_freq("text").unwrap(), Some(147));
        assert_eq!(index.sum_total_term_freq("missing").unwrap(), None);
    }

    #[test]
    fn unavailable_statistic_is_a_corpus_state_error() {
        let mut index = sample_index();
        index.set_sum_total_term_freq("text", None);

        let err = index.sum_total_term_freq("text").unwrap_err();
        assert!(matches!(err, ContextError::CorpusState { ref field } if field == "text"));
    }

    #[test]
    fn term_frequency_reads_reserved_bucket() {
        let index = sample_index();
        assert_eq!(index.term_frequency("text", "cat").unwrap(), 80);
        assert_eq!(index.term_frequency("text", "feline").unwrap(), 0);
    }

    #[test]
    fn default_term_frequency_matches_direct_lookup() {
        struct Wrapped(MemoryTermIndex);

        impl TermStatisticsSource for Wrapped {
            fn sum_total_term_freq(&self, field: &str) -> Result<Option<u64>> {
                self.0.sum_total_term_freq(field)
            }

            fn scan_prefix<'a>(&'a self, field: &str, prefix: &str) -> Result<TermIter<'a>> {
                self.0.scan_prefix(field, prefix)
            }
        }

        let wrapped = Wrapped(sample_index());
        assert_eq!(wrapped.term_frequency("text", "cat").unwrap(), 80);
    }
}
