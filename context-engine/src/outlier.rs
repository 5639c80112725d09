//! Odd-one-out detection among a handful of terms.

use tracing::{debug, instrument};

use crate::engine::ContextEngine;
use crate::error::Result;
use crate::similarity::dissimilarity;
use crate::source::TermStatisticsSource;
use crate::vector::{sort_descending, Candidate, TermVector};

/// Score each vector by the sum of its squared dissimilarities to the others.
///
/// Scores are returned in input order.
pub fn outlier_scores(vectors: &[&TermVector]) -> Vec<f64> {
    vectors
        .iter()
        .enumerate()
        .map(|(i, vector)| {
            vectors
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| dissimilarity(vector, other).powi(2))
                .sum::<f64>()
        })
        .collect()
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    /// Every term with its outlier score, highest first.
    ///
    /// Equal scores keep their input order.
    #[instrument(name = "ContextEngine::odd_one_out", skip(self))]
    pub fn odd_one_out(&self, field: &str, terms: &[String]) -> Result<Vec<Candidate>> {
        if self.field_statistics(field)?.is_none() {
            debug!("Field does not exist");
            return Ok(Vec::new());
        }

        let vectors = terms
            .iter()
            .map(|term| self.simple_vector(field, term))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&TermVector> = vectors.iter().map(|v| v.as_ref()).collect();

        let mut ranked: Vec<Candidate> = terms
            .iter()
            .zip(outlier_scores(&refs))
            .map(|(term, score)| Candidate::new(term.as_str(), score))
            .collect();
        sort_descending(&mut ranked);

        Ok(ranked)
    }
}
