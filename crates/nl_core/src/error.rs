use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The embedding service cannot be reached at all. Fatal to the run:
    /// ranking cannot proceed without embeddings.
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Embedding failed for one record. The caller drops the record and
    /// continues with the rest of the batch.
    #[error("embedding failed for record: {0}")]
    EmbeddingFailed(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Editing error: {0}")]
    Editing(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
