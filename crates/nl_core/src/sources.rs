use async_trait::async_trait;

use crate::types::{Article, Category};
use crate::Result;

/// Fetch collaborator: one configured content source yielding raw article
/// records. Failures in a single source are not fatal to a batch; the
/// manager logs and moves on.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable name of the source, used in logs.
    fn name(&self) -> &str;

    /// Category every article from this source is filed under.
    fn category(&self) -> Category;

    /// Fetch the current batch of articles from this source.
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
}
