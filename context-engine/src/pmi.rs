//! Pointwise mutual information scoring and filtering.
//!
//! For a seed `x` and a context `y` in a field with total term frequency `N`:
//!
//! ```text
//! pmi(x, y) = ln( (co(x, y) / N)^power / ((tf(x) / N) * (tf(y) / N)) )
//! ```
//!
//! optionally divided by `-ln(co(x, y) / N)` and then shifted.

use serde::Deserialize;

use crate::vector::{descending, ScoredContext, TermVector};

/// PMI hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PmiParams {
    pub power: f64,
    pub shift: f64,
    /// Contexts rarer than this across the corpus are dropped
    pub min_term_freq: u64,
    /// Contexts seen fewer times than this with the seed are dropped
    pub min_co_freq: u64,
    /// Divide by self-information (NPMI-style)
    pub normalise: bool,
}

impl Default for PmiParams {
    fn default() -> Self {
        Self {
            power: 1.0,
            shift: 0.0,
            min_term_freq: 100,
            min_co_freq: 1,
            normalise: false,
        }
    }
}

/// Field-level corpus statistics, supplied once per query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    pub sum_total_term_freq: f64,
}

impl CorpusStats {
    pub fn new(sum_total_term_freq: u64) -> Self {
        Self {
            sum_total_term_freq: sum_total_term_freq as f64,
        }
    }
}

/// PMI of a co-occurrence given both marginal frequencies.
///
/// Any zero frequency makes PMI undefined; the result is then negative
/// infinity, which every filter treats as a rejection.
pub fn pointwise_mutual_information(
    co_freq: f64,
    seed_freq: f64,
    context_freq: f64,
    stats: CorpusStats,
    params: &PmiParams,
) -> f64 {
    let n = stats.sum_total_term_freq;
    if co_freq <= 0.0 || seed_freq <= 0.0 || context_freq <= 0.0 || n <= 0.0 {
        return f64::NEG_INFINITY;
    }

    let joint = (co_freq / n).powf(params.power);
    let mut pmi = (joint / ((seed_freq / n) * (context_freq / n))).ln();
    if params.normalise {
        pmi /= -(co_freq / n).ln();
    }
    pmi - params.shift
}

/// Scores and filters a freshly accumulated vector against corpus statistics.
pub struct PmiFilter<'a> {
    params: &'a PmiParams,
    stats: CorpusStats,
    term_frequencies: &'a TermVector,
}

impl<'a> PmiFilter<'a> {
    pub fn new(params: &'a PmiParams, stats: CorpusStats, term_frequencies: &'a TermVector) -> Self {
        Self {
            params,
            stats,
            term_frequencies,
        }
    }

    /// PMI of `context` seen `co_freq` times next to `seed`.
    pub fn score(&self, co_freq: f64, seed: &str, context: &str) -> f64 {
        pointwise_mutual_information(
            co_freq,
            self.term_frequencies.weight_of(seed),
            self.term_frequencies.weight_of(context),
            self.stats,
            self.params,
        )
    }

    /// Store a PMI score on every entry and remove the entries that fail the
    /// frequency floors or score below zero. Returns the number removed.
    pub fn apply(&self, vector: &mut TermVector) -> usize {
        let seed = vector.prefix().to_string();
        let min_co_freq = self.params.min_co_freq as f64;
        let min_term_freq = self.params.min_term_freq as f64;

        let mut to_remove = Vec::new();
        for (term, entry) in vector.entries_mut() {
            let term_freq = self.term_frequencies.weight_of(term);
            if entry.weight < min_co_freq || term_freq < min_term_freq {
                to_remove.push(term.to_string());
                continue;
            }

            entry.pmi = self.score(entry.weight, &seed, term);
            // NaN fails this too
            if !(entry.pmi >= 0.0) {
                to_remove.push(term.to_string());
            }
        }

        let removed = to_remove.len();
        vector.remove_all(to_remove);
        removed
    }
}

/// Highest-PMI entries with a positive weight, up to `limit`, then trim the
/// stored vector to the returned frontier.
///
/// Every entry whose PMI is below the smallest returned PMI is removed from
/// `vector`, so repeated calls with shrinking limits shrink a shared vector.
/// An empty result trims nothing.
pub fn top_by_pmi(vector: &mut TermVector, limit: usize) -> Vec<ScoredContext> {
    let mut survivors: Vec<ScoredContext> = vector
        .iter()
        .map(|(term, entry)| ScoredContext {
            term: term.to_string(),
            weight: entry.weight,
            pmi: entry.pmi,
        })
        .collect();
    survivors.sort_by(|a, b| descending(a.pmi, b.pmi).then_with(|| a.term.cmp(&b.term)));

    let top: Vec<ScoredContext> = survivors
        .into_iter()
        .filter(|context| context.weight > 0.0)
        .take(limit)
        .collect();

    let Some(min) = top.iter().map(|c| c.pmi).reduce(f64::min) else {
        return top;
    };

    let to_remove: Vec<String> = vector
        .iter()
        .filter(|(_, entry)| entry.pmi < min)
        .map(|(term, _)| term.to_string())
        .collect();
    vector.remove_all(to_remove);

    top
}
