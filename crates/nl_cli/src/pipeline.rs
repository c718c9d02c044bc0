use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use nl_core::{Article, Config, Editor, InferenceModel, Result};
use nl_editing::correct_markdown;
use nl_fetch::SourceManager;
use nl_output::{compose, ExportFormat, Exporter, Newsletter};
use nl_ranker::{RankerConfig, SimilarityRanker};
use nl_store::SnapshotStore;

/// Wires the collaborators into one sequential run: fetch, rank, summarize,
/// edit, export. Stages never overlap; concurrency lives inside the fetch
/// and embedding steps.
pub struct Pipeline {
    sources: SourceManager,
    ranker: SimilarityRanker,
    model: Arc<dyn InferenceModel>,
    editor: Option<Box<dyn Editor>>,
    store: SnapshotStore,
    exporter: Exporter,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        sources: SourceManager,
        model: Arc<dyn InferenceModel>,
        editor: Option<Box<dyn Editor>>,
    ) -> Self {
        let ranker = SimilarityRanker::new(model.clone(), RankerConfig::from(config));
        Self {
            sources,
            ranker,
            model,
            editor,
            store: SnapshotStore::new(&config.data_dir),
            exporter: Exporter::new(&config.output_dir),
        }
    }

    /// Full pipeline run. Returns the exported file paths; an empty batch
    /// short-circuits to no files without error.
    pub async fn run(&self, formats: &[ExportFormat]) -> Result<Vec<PathBuf>> {
        info!("📰 Fetching content...");
        let batch = self.sources.fetch_all().await?;
        self.store.save("raw", &batch)?;

        info!("🔢 Ranking {} articles...", batch.len());
        let ranked = self.ranker.rank(batch).await?;
        self.store.save("ranked", &ranked)?;
        if ranked.is_empty() {
            info!("📭 Nothing to publish");
            return Ok(Vec::new());
        }

        info!("🤖 Summarizing {} articles with {}...", ranked.len(), self.model.name());
        let summarized = self.summarize(ranked).await;
        self.store.save("summarized", &summarized)?;
        if summarized.is_empty() {
            info!("📭 No summaries produced, nothing to publish");
            return Ok(Vec::new());
        }

        let newsletter = compose(&summarized, Utc::now().date_naive());
        let newsletter = self.edit(newsletter).await;

        info!("📦 Exporting newsletter...");
        let written = self.exporter.export(&newsletter, formats)?;
        self.exporter.clean_old_exports()?;
        Ok(written)
    }

    /// Fetch and rank only; used by the `rank` subcommand.
    pub async fn rank_only(&self) -> Result<Vec<Article>> {
        let batch = self.sources.fetch_all().await?;
        self.ranker.rank(batch).await
    }

    pub fn snapshots(&self) -> Result<Vec<PathBuf>> {
        self.store.list()
    }

    /// Summarize each accepted article. A failed summary drops only that
    /// article.
    async fn summarize(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut summarized = Vec::with_capacity(articles.len());
        for mut article in articles {
            match self.model.summarize_article(&article).await {
                Ok(summary) => {
                    article.summary = Some(summary);
                    summarized.push(article);
                }
                Err(e) => warn!("🤖 Skipping {}: {}", article.url, e),
            }
        }
        summarized
    }

    async fn edit(&self, newsletter: Newsletter) -> Newsletter {
        let Some(editor) = &self.editor else {
            return newsletter;
        };

        info!("📝 Checking grammar with {}...", editor.name());
        match correct_markdown(editor.as_ref(), &newsletter.content).await {
            Ok(correction) => {
                info!("📝 Applied {} fixes", correction.fixes.len());
                Newsletter {
                    content: correction.text,
                    metadata: newsletter.metadata,
                }
            }
            Err(e) => {
                // Editing is best-effort: the uncorrected draft still ships.
                warn!("📝 Editing failed, keeping draft: {}", e);
                newsletter
            }
        }
    }
}
