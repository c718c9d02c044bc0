//! Staged snapshot store: the pipeline persists the article batch as JSON
//! after each stage so a run can be inspected after the fact. The
//! similarity index itself is never persisted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use nl_core::{Article, Result};

pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Persist a batch under `<stage>-<timestamp>.json`. Returns the path
    /// written.
    pub fn save(&self, stage: &str, articles: &[Article]) -> Result<PathBuf> {
        self.save_at(stage, articles, Utc::now())
    }

    fn save_at(
        &self,
        stage: &str,
        articles: &[Article],
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;

        let path = self.data_dir.join(format!(
            "{}-{}.json",
            stage,
            timestamp.format("%Y%m%d-%H%M%S")
        ));
        let json = serde_json::to_string_pretty(articles)?;
        fs::write(&path, json)?;

        info!("💾 Saved {} articles to {}", articles.len(), path.display());
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<Vec<Article>> {
        let content = fs::read_to_string(path)?;
        let articles = serde_json::from_str(&content)?;
        Ok(articles)
    }

    /// All snapshot paths, newest first. Unreadable entries are skipped
    /// with a warning.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("💾 Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                snapshots.push(path);
            }
        }

        snapshots.sort();
        snapshots.reverse();
        Ok(snapshots)
    }
}
