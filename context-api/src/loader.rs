use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use context_engine::{CorpusBuilder, CorpusDocument, MemoryTermIndex};
use tracing::info;

use crate::config::CorpusSettings;

#[derive(Debug, thiserror::Error)]
pub enum CorpusLoadError {
    #[error("Failed to open corpus file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read corpus: {0}")]
    Read(#[from] std::io::Error),
    #[error("Malformed corpus document on line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

/// Add every JSON lines document from `reader` to `builder`.
///
/// Blank lines are skipped. Returns the number of documents added.
pub fn read_documents(
    reader: impl BufRead,
    builder: &mut CorpusBuilder,
) -> Result<usize, CorpusLoadError> {
    let mut count = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let document: CorpusDocument = serde_json::from_str(&line)
            .map_err(|source| CorpusLoadError::Malformed { line: i + 1, source })?;
        builder.add_document(&document);
        count += 1;
    }
    Ok(count)
}

/// Build the term index described by the corpus settings.
pub fn load_index(settings: &CorpusSettings) -> Result<MemoryTermIndex, CorpusLoadError> {
    let mut builder = CorpusBuilder::new(settings.corpus_config());

    let Some(path) = &settings.path else {
        info!("No corpus configured, starting with an empty index");
        return Ok(builder.build());
    };

    let file = File::open(path).map_err(|source| CorpusLoadError::Open {
        path: path.clone(),
        source,
    })?;
    let documents = read_documents(BufReader::new(file), &mut builder)?;
    info!("Loaded {} documents from {}", documents, path.display());

    Ok(builder.build())
}
