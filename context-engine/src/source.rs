//! Read-only access to term statistics held by an inverted index.
//!
//! Compound context terms are indexed as `seed:context`. A prefix scan for
//! `seed` yields every `context` suffix together with its corpus-wide
//! frequency. Per-term frequencies live under the reserved
//! [`TERM_FREQUENCY_PREFIX`].

use std::sync::Arc;

use crate::error::Result;

/// Separates the seed side of an indexed term from its context side.
pub const PREFIX_SEPARATOR: char = ':';

/// Reserved prefix under which plain term frequencies are indexed.
pub const TERM_FREQUENCY_PREFIX: &str = "__tf__";

/// Suffix bucket that is deliberately ignored during accumulation.
pub const IGNORED_SUFFIX: &str = "_";

/// A term yielded by a prefix scan, with the prefix already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFrequency {
    pub term: String,
    pub frequency: u64,
}

impl TermFrequency {
    pub fn new(term: impl Into<String>, frequency: u64) -> Self {
        Self {
            term: term.into(),
            frequency,
        }
    }
}

pub type TermIter<'a> = Box<dyn Iterator<Item = TermFrequency> + 'a>;

/// Trait for the inverted index capability consumed by the context engine.
///
/// Implementations must be safe to share across request threads.
pub trait TermStatisticsSource: Send + Sync {
    /// Sum of all term frequencies in `field`.
    ///
    /// Returns `Ok(None)` when the field does not exist and
    /// [`ContextError::CorpusState`](crate::ContextError::CorpusState) when the
    /// field exists but the statistic is unavailable.
    fn sum_total_term_freq(&self, field: &str) -> Result<Option<u64>>;

    /// Enumerate the terms of `field` that start with `prefix:`, in index
    /// order, yielding the suffix after the separator.
    ///
    /// A missing field yields an empty iterator.
    fn scan_prefix<'a>(&'a self, field: &str, prefix: &str) -> Result<TermIter<'a>>;

    /// Corpus-wide frequency of a single term.
    ///
    /// The default implementation scans the term frequency bucket. The engine
    /// itself reads frequencies from its cached table instead.
    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        Ok(self
            .scan_prefix(field, TERM_FREQUENCY_PREFIX)?
            .filter(|entry| entry.term == term)
            .map(|entry| entry.frequency)
            .sum())
    }
}

impl<S: TermStatisticsSource + ?Sized> TermStatisticsSource for Arc<S> {
    fn sum_total_term_freq(&self, field: &str) -> Result<Option<u64>> {
        (**self).sum_total_term_freq(field)
    }

    fn scan_prefix<'a>(&'a self, field: &str, prefix: &str) -> Result<TermIter<'a>> {
        (**self).scan_prefix(field, prefix)
    }

    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        (**self).term_frequency(field, term)
    }
}

/// Build the indexed form of a compound term.
pub fn compound_term(prefix: &str, suffix: &str) -> String {
    let mut term = String::with_capacity(prefix.len() + suffix.len() + 1);
    term.push_str(prefix);
    term.push(PREFIX_SEPARATOR);
    term.push_str(suffix);
    term
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the trait is object-safe (can be used as a trait object)
    fn _assert_source_object_safe(_: &dyn TermStatisticsSource) {}

    #[test]
    fn compound_term_joins_with_separator() {
        assert_eq!(compound_term("cat", "feline"), "cat:feline");
        assert_eq!(compound_term(TERM_FREQUENCY_PREFIX, "cat"), "__tf__:cat");
    }
}
