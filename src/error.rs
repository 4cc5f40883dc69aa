use std::path::PathBuf;

use thiserror::Error;

/// Failures that keep the query engine from ever becoming ready.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("LLM_API_KEY (or OPENAI_API_KEY) is not set")]
    MissingCredentials,

    #[error("LLM_MODEL is empty")]
    MissingModel,

    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("no sections could be parsed from {}", .0.display())]
    EmptyDocument(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid section marker: {0}")]
    InvalidMarker(#[from] regex::Error),
}
