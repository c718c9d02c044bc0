use std::fmt;

use async_trait::async_trait;

use nl_core::{Article, InferenceModel, Result};

/// Embedding dimension of the hosted sentence-embedding model; the dummy
/// mirrors it so vectors are interchangeable in tests and dry runs.
pub const VECTOR_SIZE: usize = 384;

const SUMMARY_WORDS: usize = 30;

/// Offline model for tests and dry runs. Embeddings are derived from
/// character frequencies, so identical text always maps to the identical
/// vector and unrelated texts rarely collide.
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

#[async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = vec![0.0f32; VECTOR_SIZE];

        let text_len = text.chars().count().max(1) as f32;
        embedding[0] = text_len / 1000.0;

        // Bucket character counts into the remaining dimensions.
        for c in text.chars() {
            let bucket = (c as usize % (VECTOR_SIZE - 1)) + 1;
            embedding[bucket] += 1.0 / text_len;
        }

        Ok(embedding)
    }

    async fn summarize_article(&self, article: &Article) -> Result<String> {
        let words: Vec<&str> = article.body.split_whitespace().take(SUMMARY_WORDS).collect();
        Ok(words.join(" "))
    }
}
