//! Cosine similarity between mass-normalised context vectors.

use tracing::{debug, instrument};

use crate::engine::ContextEngine;
use crate::error::Result;
use crate::source::TermStatisticsSource;
use crate::vector::TermVector;

/// Cosine similarity of two context vectors.
///
/// Each component is the entry's weight divided by its own vector's total
/// mass. Returns `0.0` when either vector has a zero norm.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let sum_sq_a: f64 = a.terms().map(|key| a.contribution(key).powi(2)).sum();
    let sum_sq_b: f64 = b.terms().map(|key| b.contribution(key).powi(2)).sum();
    let sum_ab: f64 = a
        .terms()
        .filter(|key| b.contains(key))
        .map(|key| a.contribution(key) * b.contribution(key))
        .sum();

    let denom = sum_sq_a.sqrt() * sum_sq_b.sqrt();
    if denom > 0.0 {
        sum_ab / denom
    } else {
        0.0
    }
}

/// `1 - cosine`, used where a dissimilarity is needed.
pub fn dissimilarity(a: &TermVector, b: &TermVector) -> f64 {
    1.0 - cosine_similarity(a, b)
}

impl<S> ContextEngine<S>
where
    S: TermStatisticsSource,
{
    /// Cosine similarity of the raw context vectors of `a` and `b`.
    ///
    /// A field that does not exist has no similarity, so `0.0` is returned.
    #[instrument(name = "ContextEngine::similarity", skip(self))]
    pub fn similarity(&self, field: &str, a: &str, b: &str) -> Result<f64> {
        if self.field_statistics(field)?.is_none() {
            debug!("Field does not exist");
            return Ok(0.0);
        }

        let a = self.simple_vector(field, a)?;
        let b = self.simple_vector(field, b)?;
        Ok(cosine_similarity(&a, &b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::cat_index;

    fn vector(prefix: &str, weights: &[(&str, f64)]) -> TermVector {
        TermVector::from_weights(prefix, weights.iter().copied())
    }

    #[test]
    fn half_overlap_is_one_half() {
        let a = vector("a", &[("a", 1.0), ("b", 1.0)]);
        let b = vector("b", &[("a", 1.0), ("c", 1.0)]);

        assert!((cosine_similarity(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = vector("a", &[("x", 3.0), ("y", 1.0), ("z", 7.0)]);
        let b = vector("b", &[("x", 2.0), ("z", 0.5), ("w", 4.0)]);

        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab > 0.0 && ab < 1.0);
    }

    #[test]
    fn self_similarity_is_one() {
        let a = vector("a", &[("x", 3.0), ("y", 1.0), ("z", 7.0)]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_vector_has_zero_similarity() {
        let a = vector("a", &[("x", 3.0)]);
        let empty = TermVector::new("empty");

        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
        assert_eq!(dissimilarity(&a, &empty), 1.0);
    }

    #[test]
    fn disjoint_vectors_are_orthogonal() {
        let a = vector("a", &[("x", 1.0)]);
        let b = vector("b", &[("y", 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn pruned_vector_keeps_corpus_mass_in_normalisation() {
        let mut a = vector("a", &[("x", 1.0), ("y", 3.0)]);
        let b = vector("b", &[("x", 1.0)]);
        a.remove_all(["y"]);

        // Only "x" remains; both sides collapse onto one axis
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
        assert_eq!(a.total_mass(), 4.0);
    }

    #[test]
    fn engine_similarity_uses_raw_vectors() {
        let engine = ContextEngine::with_defaults(cat_index());

        let cat_dog = engine.similarity("text", "cat", "dog").unwrap();
        let dog_cat = engine.similarity("text", "dog", "cat").unwrap();
        assert!(cat_dog > 0.0 && cat_dog < 1.0);
        assert!((cat_dog - dog_cat).abs() < 1e-12);
        assert!((engine.similarity("text", "cat", "cat").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn engine_similarity_on_missing_field_is_zero() {
        let engine = ContextEngine::with_defaults(cat_index());
        assert_eq!(engine.similarity("missing", "cat", "dog").unwrap(), 0.0);
    }
}
