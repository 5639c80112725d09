//! Term co-occurrence analytics over an inverted index.
//!
//! Context vectors are built by scanning `seed:context` terms that share a
//! seed prefix. On top of them the engine predicts associated words through
//! pointwise mutual information, and answers similarity, analogy and
//! odd-one-out queries with cosine similarity.

mod accumulator;
mod analogy;
mod cache;
mod corpus;
mod engine;
mod error;
mod memory;
mod outlier;
mod pmi;
mod prediction;
mod request;
mod similarity;
mod source;
mod vector;

pub use accumulator::CoOccurrenceAccumulator;
pub use analogy::{offset_vector, Analogy};
pub use cache::{CacheConfig, CacheKey, CacheStats, ContextCache, SharedVector};
pub use corpus::{tokenize, CorpusBuilder, CorpusConfig, CorpusDocument};
pub use engine::{ContextEngine, EngineConfig};
pub use error::{ContextError, Result};
pub use memory::MemoryTermIndex;
pub use outlier::outlier_scores;
pub use pmi::{pointwise_mutual_information, top_by_pmi, CorpusStats, PmiFilter, PmiParams};
pub use prediction::{Prediction, PredictionParams, ScoringMode};
pub use request::{ContextParams, ContextQuery, ContextRequest, ContextResponse, FieldPrediction};
pub use similarity::{cosine_similarity, dissimilarity};
pub use source::{
    compound_term, TermFrequency, TermIter, TermStatisticsSource, IGNORED_SUFFIX,
    PREFIX_SEPARATOR, TERM_FREQUENCY_PREFIX,
};
pub use vector::{sort_descending, Candidate, CandidateKey, ContextWeight, ScoredContext, TermVector};
