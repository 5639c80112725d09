/// Error type for context analytics operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContextError {
    /// The field exists but its total term frequency statistic is unavailable,
    /// which means the index is inconsistent or not ready.
    #[error("total term frequency unavailable for field '{field}'")]
    CorpusState { field: String },
}

impl ContextError {
    pub fn corpus_state(field: impl Into<String>) -> Self {
        Self::CorpusState {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContextError>;
