//! Seed to context to word predictions, aggregated over PMI products.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::engine::ContextEngine;
use crate::error::Result;
use crate::pmi::{top_by_pmi, CorpusStats, PmiFilter, PmiParams};
use crate::similarity::cosine_similarity;
use crate::source::TermStatisticsSource;
use crate::vector::{rank_scores, sort_descending, Candidate, CandidateKey, ScoredContext};

/// How contributions of a context to a word are scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringMode {
    /// `pmi(seed, context) * max(pmi(word, context), 0)`
    #[default]
    Pmi,
    /// Legacy co-frequency ratio
    Ratio,
}

impl ScoringMode {
    /// `pmi` in any case selects PMI scoring; anything else is the ratio mode.
    pub fn from_param(value: &str) -> Self {
        if value.eq_ignore_ascii_case("pmi") {
            Self::Pmi
        } else {
            Self::Ratio
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionParams {
    pub limit: usize,
    pub mode: ScoringMode,
    pub pmi: PmiParams,
    /// Replace final scores by cosine similarity to the seed
    pub rerank: bool,
}

impl Default for PredictionParams {
    fn default() -> Self {
        Self {
            limit: 100,
            mode: ScoringMode::Pmi,
            pmi: PmiParams::default(),
            rerank: true,
        }
    }
}

/// Outcome of a prediction for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prediction {
    /// Every aggregated word, by descending score
    pub ranking: Vec<Candidate>,
    /// Positive-score words up to the limit, reranked when requested
    pub candidates: Vec<Candidate>,
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    /// Predict the words most associated with `seed` in `field`.
    ///
    /// A field that does not exist yields an empty prediction.
    #[instrument(name = "ContextEngine::predict", skip(self, params))]
    pub fn predict(&self, field: &str, seed: &str, params: &PredictionParams) -> Result<Prediction> {
        let Some(stats) = self.field_statistics(field)? else {
            debug!("Field does not exist");
            return Ok(Prediction::default());
        };

        let ranking = self.aggregate_predictions(field, seed, params, stats)?;
        let mut candidates: Vec<Candidate> = ranking
            .iter()
            .filter(|candidate| candidate.weight > 0.0)
            .take(params.limit)
            .cloned()
            .collect();

        if params.rerank && !candidates.is_empty() {
            // Snapshot the seed so no two vector locks are ever held together
            let seed_vector = self
                .pmi_vector(field, seed, &params.pmi, stats, params.limit)?
                .read()
                .clone();

            for candidate in &mut candidates {
                let vector =
                    self.pmi_vector(field, &candidate.key, &params.pmi, stats, params.limit)?;
                candidate.weight = cosine_similarity(&seed_vector, &vector.read());
            }
            sort_descending(&mut candidates);
        }

        debug!(
            ranked = ranking.len(),
            returned = candidates.len(),
            "Prediction complete"
        );
        Ok(Prediction {
            ranking,
            candidates,
        })
    }

    /// Aggregate word scores over the seed's top contexts, sorted descending.
    pub(crate) fn aggregate_predictions(
        &self,
        field: &str,
        seed: &str,
        params: &PredictionParams,
        stats: CorpusStats,
    ) -> Result<Vec<Candidate>> {
        let term_frequencies = self.term_frequencies(field)?;
        let filter = PmiFilter::new(&params.pmi, stats, &term_frequencies);
        let seed_freq = term_frequencies.weight_of(seed);

        let contexts = self.top_contexts(field, seed, params, stats, self.config().max_contexts)?;

        let mut scores: HashMap<CandidateKey, f64> = HashMap::new();
        for context in &contexts {
            let pmi_to_context = filter.score(context.weight, seed, &context.term);
            if params.mode == ScoringMode::Pmi && !(pmi_to_context > 0.0) {
                continue;
            }

            let context_freq = term_frequencies.weight_of(&context.term);
            let words =
                self.top_contexts(field, &context.term, params, stats, self.config().max_words)?;

            for word in words {
                let contribution = match params.mode {
                    ScoringMode::Pmi => {
                        let pmi_from_context =
                            filter.score(word.weight, &word.term, &context.term).max(0.0);
                        pmi_to_context * pmi_from_context
                    }
                    ScoringMode::Ratio if context_freq > 0.0 && seed_freq > 0.0 => {
                        context.weight * word.weight / context_freq / seed_freq
                    }
                    ScoringMode::Ratio => 0.0,
                };

                // The seed predicts itself through every context; credit the context instead
                let key = if word.term == seed {
                    CandidateKey::new(context.term.as_str())
                } else {
                    CandidateKey::new(word.term)
                };
                *scores.entry(key).or_insert(0.0) += contribution;
            }
        }

        Ok(rank_scores(scores))
    }

    fn top_contexts(
        &self,
        field: &str,
        prefix: &str,
        params: &PredictionParams,
        stats: CorpusStats,
        limit: usize,
    ) -> Result<Vec<ScoredContext>> {
        let vector = self.pmi_vector(field, prefix, &params.pmi, stats, params.limit)?;
        let mut vector = vector.write();
        Ok(top_by_pmi(&mut vector, limit))
    }
}
