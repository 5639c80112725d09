//! "A is to B as C is to ?" over raw context vectors.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::engine::ContextEngine;
use crate::error::Result;
use crate::prediction::PredictionParams;
use crate::similarity::cosine_similarity;
use crate::source::TermStatisticsSource;
use crate::vector::{sort_descending, Candidate, TermVector};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analogy {
    /// `contrib(A) - contrib(B) + contrib(C)` per context term; not used for ranking
    pub offset: TermVector,
    pub ranked: Vec<Candidate>,
}

/// Offset vector over the union of the three vectors' terms.
pub fn offset_vector(a: &TermVector, b: &TermVector, c: &TermVector) -> TermVector {
    let terms: HashSet<&str> = a.terms().chain(b.terms()).chain(c.terms()).collect();

    let mut offset = TermVector::new("");
    for term in terms {
        let value = a.contribution(term) - b.contribution(term) + c.contribution(term);
        offset.add(term, value);
    }
    offset
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    /// Rank candidates `x` completing "`a` is to `b` as `c` is to `x`".
    ///
    /// Candidates are the positive-score words predicted from `a`, each scored
    /// `cos(A, x) * cos(C, x) / (cos(B, x) + epsilon)` on raw vectors.
    #[instrument(name = "ContextEngine::analogy", skip(self, params))]
    pub fn analogy(
        &self,
        field: &str,
        a: &str,
        b: &str,
        c: &str,
        params: &PredictionParams,
    ) -> Result<Analogy> {
        let Some(stats) = self.field_statistics(field)? else {
            debug!("Field does not exist");
            return Ok(Analogy::default());
        };

        let vector_a = self.simple_vector(field, a)?;
        let vector_b = self.simple_vector(field, b)?;
        let vector_c = self.simple_vector(field, c)?;
        let offset = offset_vector(&vector_a, &vector_b, &vector_c);

        let epsilon = self.config().analogy_epsilon;
        let ranking = self.aggregate_predictions(field, a, params, stats)?;

        let mut ranked = Vec::new();
        for candidate in ranking
            .into_iter()
            .filter(|candidate| candidate.weight > 0.0)
            .take(params.limit)
        {
            let vector = self.simple_vector(field, &candidate.key)?;
            let to_a = cosine_similarity(&vector_a, &vector);
            let to_b = cosine_similarity(&vector_b, &vector);
            let to_c = cosine_similarity(&vector_c, &vector);
            ranked.push(Candidate::new(candidate.key, to_a * to_c / (to_b + epsilon)));
        }
        sort_descending(&mut ranked);

        Ok(Analogy { offset, ranked })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::cat_index;
    use crate::pmi::PmiParams;

    fn params() -> PredictionParams {
        PredictionParams {
            pmi: PmiParams {
                min_term_freq: 10,
                ..PmiParams::default()
            },
            ..PredictionParams::default()
        }
    }

    #[test]
    fn offset_combines_normalised_contributions() {
        let a = TermVector::from_weights("a", [("x", 1.0), ("y", 3.0)]);
        let b = TermVector::from_weights("b", [("x", 2.0), ("z", 2.0)]);
        let c = TermVector::from_weights("c", [("y", 5.0)]);

        let offset = offset_vector(&a, &b, &c);
        assert_eq!(offset.len(), 3);
        assert!((offset.weight_of("x") - (0.25 - 0.5)).abs() < 1e-12);
        assert!((offset.weight_of("y") - (0.75 + 1.0)).abs() < 1e-12);
        assert!((offset.weight_of("z") + 0.5).abs() < 1e-12);
    }

    #[test]
    fn analogy_ranks_predicted_candidates() {
        let engine = ContextEngine::with_defaults(cat_index());
        let analogy = engine.analogy("text", "cat", "dog", "feline", &params()).unwrap();

        let keys: Vec<_> = analogy.ranked.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["purr", "feline"]);
        assert!(analogy.ranked[0].weight > analogy.ranked[1].weight);

        assert!((analogy.offset.weight_of("bark") + 30.0 / 80.0).abs() < 1e-12);
        assert!((analogy.offset.weight_of("cat") - 50.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn analogy_on_missing_field_is_empty() {
        let engine = ContextEngine::with_defaults(cat_index());
        let analogy = engine
            .analogy("missing", "cat", "dog", "feline", &params())
            .unwrap();
        assert!(analogy.ranked.is_empty());
        assert!(analogy.offset.is_empty());
    }
}
