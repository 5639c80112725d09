//! Sparse context vectors and ranked candidates.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

/// Aggregate weight and PMI score of one context term.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextWeight {
    pub weight: f64,
    pub pmi: f64,
}

/// Sparse mapping from context term to weight, built for one seed prefix.
///
/// `total_mass` is the sum of weights at scan time. Pruning removes entries
/// but leaves `total_mass` untouched, so normalised contributions keep
/// reflecting the full corpus mass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    prefix: String,
    entries: HashMap<String, ContextWeight>,
    total_mass: f64,
}

impl TermVector {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: HashMap::new(),
            total_mass: 0.0,
        }
    }

    /// Build a vector from `(term, weight)` pairs.
    pub fn from_weights<K: Into<String>>(
        prefix: impl Into<String>,
        weights: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        let mut vector = Self::new(prefix);
        for (term, weight) in weights {
            vector.add(term, weight);
        }
        vector
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&ContextWeight> {
        self.entries.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    /// Weight of `term`, or zero when absent.
    pub fn weight_of(&self, term: &str) -> f64 {
        self.entries.get(term).map(|e| e.weight).unwrap_or(0.0)
    }

    /// Weight of `term` normalised by the vector's total mass.
    pub fn contribution(&self, term: &str) -> f64 {
        match self.entries.get(term) {
            Some(entry) if self.total_mass != 0.0 => entry.weight / self.total_mass,
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextWeight)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Add `weight` to `term` and to the total mass.
    pub fn add(&mut self, term: impl Into<String>, weight: f64) {
        self.entries.entry(term.into()).or_default().weight += weight;
        self.total_mass += weight;
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut ContextWeight)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove the given terms. Total mass is left as is.
    pub(crate) fn remove_all<Q>(&mut self, terms: impl IntoIterator<Item = Q>)
    where
        Q: Borrow<str>,
    {
        for term in terms {
            self.entries.remove(term.borrow());
        }
    }
}

/// Immutable identity of a candidate, used only for map lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey(String);

impl CandidateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Borrow<str> for CandidateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A ranked term with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(rename = "term")]
    pub key: String,
    #[serde(rename = "score")]
    pub weight: f64,
}

impl Candidate {
    pub fn new(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            weight,
        }
    }
}

/// Context term returned by a PMI top-K query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredContext {
    pub term: String,
    pub weight: f64,
    pub pmi: f64,
}

/// Stable sort by descending weight. NaN sorts last.
pub fn sort_descending(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| descending(a.weight, b.weight));
}

pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Turn accumulated scores into candidates sorted by descending score.
///
/// Ties are broken by key so the ranking does not depend on hash order.
pub(crate) fn rank_scores(scores: HashMap<CandidateKey, f64>) -> Vec<Candidate> {
    let mut ranked: Vec<(CandidateKey, f64)> = scores.into_iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| descending(*a, *b).then_with(|| ka.cmp(kb)));
    ranked
        .into_iter()
        .map(|(key, score)| Candidate::new(key.into_inner(), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_weight_and_mass() {
        let mut vector = TermVector::new("cat");
        vector.add("feline", 3.0);
        vector.add("feline", 2.0);
        vector.add("dog", 5.0);

        assert_eq!(vector.weight_of("feline"), 5.0);
        assert_eq!(vector.total_mass(), 10.0);
        assert_eq!(vector.contribution("dog"), 0.5);
        assert_eq!(vector.contribution("missing"), 0.0);
    }

    #[test]
    fn removal_keeps_total_mass() {
        let mut vector = TermVector::from_weights("cat", [("a", 1.0), ("b", 3.0)]);
        vector.remove_all(["b"]);

        assert_eq!(vector.len(), 1);
        assert_eq!(vector.total_mass(), 4.0);
        assert_eq!(vector.contribution("a"), 0.25);
    }

    #[test]
    fn sort_descending_puts_nan_last() {
        let mut candidates = vec![
            Candidate::new("nan", f64::NAN),
            Candidate::new("low", 0.1),
            Candidate::new("high", 0.9),
        ];
        sort_descending(&mut candidates);

        let keys: Vec<_> = candidates.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["high", "low", "nan"]);
    }

    #[test]
    fn rank_scores_breaks_ties_by_key() {
        let scores = HashMap::from([
            (CandidateKey::new("b"), 1.0),
            (CandidateKey::new("a"), 1.0),
            (CandidateKey::new("c"), 2.0),
        ]);

        let ranked = rank_scores(scores);
        let keys: Vec<_> = ranked.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn candidate_serializes_as_term_and_score() {
        let json = serde_json::to_value(Candidate::new("feline", 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "term": "feline", "score": 2.5 }));
    }
}
