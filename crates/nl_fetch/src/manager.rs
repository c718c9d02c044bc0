use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use nl_core::{Article, Category, ContentSource, Error, Result};

use crate::sources::{FileSource, JsonFeedSource};

const FETCH_CONCURRENCY: usize = 4;

/// Aggregates the configured sources into one batch. A source that fails is
/// logged and skipped; it never sinks the batch.
pub struct SourceManager {
    sources: Vec<Box<dyn ContentSource>>,
    semaphore: Arc<Semaphore>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            semaphore: Arc::new(Semaphore::new(FETCH_CONCURRENCY)),
        }
    }

    pub fn add_source(&mut self, source: Box<dyn ContentSource>) {
        self.sources.push(source);
    }

    /// Build a source from a CLI spec: `<category>=<url-or-path>`. HTTP(S)
    /// specs become feed sources, everything else a local file.
    pub fn add_spec(&mut self, spec: &str) -> Result<()> {
        let (category_raw, location) = spec
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("invalid source spec: {} (expected <category>=<url-or-path>)", spec)))?;
        let category: Category = category_raw.parse()?;

        if location.starts_with("http://") || location.starts_with("https://") {
            self.add_source(Box::new(JsonFeedSource::new(
                location.to_string(),
                location.to_string(),
                category,
            )));
        } else {
            let name = Path::new(location)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(location)
                .to_string();
            self.add_source(Box::new(FileSource::new(name, location, category)));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Fetch every source concurrently (bounded) and concatenate the
    /// batches in source order.
    pub async fn fetch_all(&self) -> Result<Vec<Article>> {
        let futures: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let semaphore = self.semaphore.clone();
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| Error::External(e.into()))?;
                    source.fetch_articles().await
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut articles = Vec::new();
        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(batch) => {
                    info!("📥 {} yielded {} articles", source.name(), batch.len());
                    articles.extend(batch);
                }
                Err(e) => warn!("📥 Skipping source {}: {}", source.name(), e),
            }
        }
        Ok(articles)
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}
