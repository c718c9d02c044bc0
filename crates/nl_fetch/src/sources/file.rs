use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use nl_core::{Article, Category, ContentSource, Error, Result};

use super::FeedItem;

/// Reads a JSON feed of articles from a local file. Useful for offline runs
/// and for feeding the pipeline from other tooling.
pub struct FileSource {
    name: String,
    path: PathBuf,
    category: Category,
}

impl FileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            category,
        }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let items: Vec<FeedItem> = serde_json::from_str(&content)
            .map_err(|e| Error::Fetch(format!("invalid feed {}: {}", self.path.display(), e)))?;

        let fetched_at = Utc::now();
        items
            .into_iter()
            .map(|item| item.into_article(self.category, fetched_at))
            .collect()
    }
}
