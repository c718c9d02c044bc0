use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use nl_core::{Article, Category, ContentSource, Error, Result};

use super::FeedItem;

/// Fetches a JSON feed of articles over HTTP.
pub struct JsonFeedSource {
    name: String,
    feed_url: String,
    category: Category,
    client: Arc<Client>,
}

impl JsonFeedSource {
    pub fn new(name: impl Into<String>, feed_url: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            feed_url: feed_url.into(),
            category,
            client: Arc::new(Client::new()),
        }
    }
}

#[async_trait]
impl ContentSource for JsonFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let response = self.client.get(&self.feed_url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "{} returned {}",
                self.feed_url,
                response.status()
            )));
        }

        let items = response
            .json::<Vec<FeedItem>>()
            .await
            .map_err(|e| Error::Fetch(format!("invalid feed from {}: {}", self.feed_url, e)))?;

        debug!("📥 {} returned {} items", self.name, items.len());

        let fetched_at = Utc::now();
        items
            .into_iter()
            .map(|item| item.into_article(self.category, fetched_at))
            .collect()
    }
}
