use async_trait::async_trait;
use std::fmt;

use crate::types::Article;
use crate::Result;

/// Inference collaborator: produces a vector for text and a summary for an
/// article. Concrete providers live in `nl_inference` so they are swappable
/// without touching selection logic.
#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate an embedding vector for a piece of text. Deterministic for
    /// identical text.
    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>>;

    /// Summarize an entire article.
    async fn summarize_article(&self, article: &Article) -> Result<String>;
}
