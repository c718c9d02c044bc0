pub mod manager;
pub mod sources;

pub use manager::SourceManager;
pub use sources::{FeedItem, FileSource, JsonFeedSource};

pub mod prelude {
    pub use super::sources::{FileSource, JsonFeedSource};
    pub use super::SourceManager;
    pub use nl_core::{Article, Category, ContentSource, Error, Result};
}
