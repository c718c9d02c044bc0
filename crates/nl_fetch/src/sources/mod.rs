use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use nl_core::{Article, Category, Error, Result};

pub mod file;
pub mod json_feed;

pub use file::FileSource;
pub use json_feed::JsonFeedSource;

/// One entry of a JSON feed, the wire format every source speaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub url: String,
    pub title: String,
    #[serde(alias = "content")]
    pub body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    /// Turn a feed entry into an article record, validating the identifier.
    pub fn into_article(
        self,
        category: Category,
        fetched_at: DateTime<Utc>,
    ) -> Result<Article> {
        Url::parse(&self.url)
            .map_err(|e| Error::Fetch(format!("invalid article url {}: {}", self.url, e)))?;

        Ok(Article {
            url: self.url,
            title: self.title,
            body: self.body,
            category,
            fetched_at,
            published_at: self.published_at,
            summary: None,
        })
    }
}
