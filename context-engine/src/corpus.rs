//! Builds co-occurrence statistics from tokenised documents.

use std::collections::HashMap;

use serde::Deserialize;

use crate::memory::MemoryTermIndex;

/// A document to be indexed for context analytics.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusDocument {
    /// Target field; the builder's default field is used when absent
    #[serde(default)]
    pub field: Option<String>,
    pub text: String,
}

/// Configuration for the corpus builder.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Field used for documents that do not name one
    pub default_field: String,
    /// Number of tokens on each side counted as context
    pub window: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            default_field: "text".to_string(),
            window: 5,
        }
    }
}

#[derive(Debug, Default)]
struct FieldCounts {
    term_frequencies: HashMap<String, u64>,
    co_occurrences: HashMap<(String, String), u64>,
    tokens: u64,
}

/// Accumulates windowed co-occurrence counts and produces a [`MemoryTermIndex`].
///
/// Every token occurrence contributes to its `__tf__` frequency, and every
/// ordered pair of distinct positions inside the window contributes to the
/// `seed:context` pair term. The field's total term frequency is the number
/// of token occurrences, so `tf / total` and `co / total` read as probabilities.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    config: CorpusConfig,
    fields: HashMap<String, FieldCounts>,
    documents: usize,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self {
            config,
            fields: HashMap::new(),
            documents: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CorpusConfig::default())
    }

    pub fn add_document(&mut self, document: &CorpusDocument) {
        let field = document
            .field
            .as_deref()
            .unwrap_or(&self.config.default_field)
            .to_string();
        let tokens = tokenize(&document.text);
        self.add_tokens(&field, &tokens);
    }

    pub fn add_tokens(&mut self, field: &str, tokens: &[String]) {
        let window = self.config.window;
        let counts = self.fields.entry(field.to_string()).or_default();

        for (i, token) in tokens.iter().enumerate() {
            *counts.term_frequencies.entry(token.clone()).or_insert(0) += 1;
            counts.tokens += 1;

            let start = i.saturating_sub(window);
            let end = (i + window + 1).min(tokens.len());
            for (j, context) in tokens.iter().enumerate().take(end).skip(start) {
                if j == i {
                    continue;
                }
                *counts
                    .co_occurrences
                    .entry((token.clone(), context.clone()))
                    .or_insert(0) += 1;
            }
        }

        self.documents += 1;
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn build(self) -> MemoryTermIndex {
        let mut index = MemoryTermIndex::new();

        for (field, counts) in self.fields {
            for (term, frequency) in &counts.term_frequencies {
                index.add_term_frequency(&field, term, *frequency);
            }
            for ((seed, context), frequency) in &counts.co_occurrences {
                index.add_co_occurrence(&field, seed, context, *frequency);
            }
            index.set_sum_total_term_freq(&field, Some(counts.tokens));
        }

        index
    }
}

/// Lowercase and split on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
