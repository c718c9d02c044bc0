use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use nl_core::{Article, Config, Error, InferenceModel, Result};

use crate::index::SimilarityIndex;
use crate::relevance::relevance_score;

const DEFAULT_EMBED_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Records whose nearest accepted neighbor reaches this similarity are
    /// discarded as near-duplicates.
    pub duplicate_threshold: f32,
    pub max_articles: usize,
    pub max_age_days: i64,
    pub keywords: Vec<String>,
    /// Worker-pool bound for concurrent embedding calls.
    pub embed_concurrency: usize,
}

impl From<&Config> for RankerConfig {
    fn from(config: &Config) -> Self {
        Self {
            duplicate_threshold: config.similarity_threshold,
            max_articles: config.max_articles,
            max_age_days: config.max_age_days,
            keywords: config.keywords.clone(),
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
        }
    }
}

/// Deduplicates and relevance-orders one batch of fetched articles.
///
/// Embedding calls run concurrently behind a semaphore; the index build and
/// selection wait for the whole batch (a join point). The index lives for
/// one `rank` call and is dropped with it.
pub struct SimilarityRanker {
    model: Arc<dyn InferenceModel>,
    config: RankerConfig,
}

impl SimilarityRanker {
    pub fn new(model: Arc<dyn InferenceModel>, config: RankerConfig) -> Self {
        Self { model, config }
    }

    /// Embed one record through the inference collaborator.
    pub async fn embed(&self, article: &Article) -> Result<Vec<f32>> {
        self.model
            .generate_embeddings(&article.embedding_text())
            .await
    }

    /// Build the per-batch similarity index from embedded records.
    pub fn build_index<I>(&self, vectors: I) -> SimilarityIndex
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        SimilarityIndex::build(vectors)
    }

    /// Rank a batch: drop stale records, embed the rest concurrently, then
    /// greedily select representatives in relevance order.
    ///
    /// A record whose embedding fails is dropped from consideration; an
    /// unreachable embedding service aborts the run. An empty batch yields
    /// an empty output without error.
    pub async fn rank(&self, batch: Vec<Article>) -> Result<Vec<Article>> {
        if batch.is_empty() {
            info!("📭 Empty batch, nothing to rank");
            return Ok(Vec::new());
        }

        let reference = Utc::now();
        let total = batch.len();
        let fresh = self.filter_by_age(batch, reference);
        if fresh.len() < total {
            info!("🗓️ Dropped {} stale articles", total - fresh.len());
        }

        let embedded = self.embed_batch(fresh).await?;
        if embedded.is_empty() {
            info!("📭 No articles survived embedding");
            return Ok(Vec::new());
        }

        let index = self.build_index(
            embedded
                .iter()
                .map(|(article, vector)| (article.url.clone(), vector.clone())),
        );

        let articles = embedded.into_iter().map(|(article, _)| article).collect();
        let selected = self.select_representatives(&index, articles, reference);
        info!(
            "🏁 Selected {} of {} fetched articles",
            selected.len(),
            total
        );
        Ok(selected)
    }

    fn filter_by_age(&self, batch: Vec<Article>, reference: DateTime<Utc>) -> Vec<Article> {
        let cutoff = reference - Duration::days(self.config.max_age_days);
        batch
            .into_iter()
            .filter(|article| article.effective_date() >= cutoff)
            .collect()
    }

    /// Embed every record in the batch, bounded by the worker pool. Returns
    /// the records that embedded successfully, in input order.
    async fn embed_batch(&self, batch: Vec<Article>) -> Result<Vec<(Article, Vec<f32>)>> {
        let semaphore = Arc::new(Semaphore::new(self.config.embed_concurrency.max(1)));

        let futures: Vec<_> = batch
            .iter()
            .map(|article| {
                let model = self.model.clone();
                let semaphore = semaphore.clone();
                let text = article.embedding_text();
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| Error::External(e.into()))?;
                    model.generate_embeddings(&text).await
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut embedded = Vec::with_capacity(batch.len());
        for (article, result) in batch.into_iter().zip(results) {
            match result {
                Ok(vector) => embedded.push((article, vector)),
                Err(Error::EmbeddingUnavailable(reason)) => {
                    return Err(Error::EmbeddingUnavailable(reason));
                }
                Err(e) => warn!("🔢 Dropping {}: {}", article.url, e),
            }
        }
        Ok(embedded)
    }

    /// Greedy selection: walk candidates in relevance order, accept a record
    /// iff its nearest already-accepted neighbor's similarity is strictly
    /// below the duplicate threshold. Ties in ordering break toward the
    /// earlier fetch timestamp, then the identifier.
    pub fn select_representatives(
        &self,
        index: &SimilarityIndex,
        candidates: Vec<Article>,
        reference: DateTime<Utc>,
    ) -> Vec<Article> {
        let mut scored: Vec<(f32, Article)> = candidates
            .into_iter()
            .map(|article| {
                (
                    relevance_score(&article, &self.config.keywords, reference),
                    article,
                )
            })
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.fetched_at.cmp(&b.fetched_at))
                .then_with(|| a.url.cmp(&b.url))
        });

        let mut accepted: Vec<Article> = Vec::new();
        for (score, candidate) in scored {
            if accepted.len() >= self.config.max_articles {
                break;
            }

            let nearest_accepted =
                index.max_similarity(&candidate.url, accepted.iter().map(|a| a.url.as_str()));

            match nearest_accepted {
                Some(similarity) if similarity >= self.config.duplicate_threshold => {
                    debug!(
                        "🧹 Discarding near-duplicate {} (similarity {:.3})",
                        candidate.url, similarity
                    );
                }
                _ => {
                    debug!("✔️ Accepted {} (relevance {:.3})", candidate.url, score);
                    accepted.push(candidate);
                }
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nl_core::Category;
    use std::collections::HashMap;

    /// Inference stub keyed by embedding text; a missing key fails the
    /// record the way a rejected provider call would.
    #[derive(Debug, Default)]
    struct KeyedModel {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl KeyedModel {
        fn with(mut self, article: &Article, vector: Vec<f32>) -> Self {
            self.vectors.insert(article.embedding_text(), vector);
            self
        }
    }

    #[async_trait]
    impl InferenceModel for KeyedModel {
        fn name(&self) -> &str {
            "keyed"
        }

        async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| Error::EmbeddingFailed(format!("no vector for: {}", text)))
        }

        async fn summarize_article(&self, article: &Article) -> Result<String> {
            Ok(format!("summary of {}", article.title))
        }
    }

    #[derive(Debug)]
    struct UnreachableModel;

    #[async_trait]
    impl InferenceModel for UnreachableModel {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn generate_embeddings(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::EmbeddingUnavailable("connection refused".to_string()))
        }

        async fn summarize_article(&self, _article: &Article) -> Result<String> {
            Err(Error::Inference("unreachable".to_string()))
        }
    }

    fn article(url: &str, title: &str, hours_ago: i64) -> Article {
        let fetched = Utc::now() - Duration::hours(hours_ago);
        Article {
            url: url.to_string(),
            title: title.to_string(),
            body: format!("Body of {}", title),
            category: Category::Ai,
            fetched_at: fetched,
            published_at: Some(fetched),
            summary: None,
        }
    }

    fn config(threshold: f32) -> RankerConfig {
        RankerConfig {
            duplicate_threshold: threshold,
            max_articles: 10,
            max_age_days: 7,
            keywords: vec!["ai".to_string()],
            embed_concurrency: 2,
        }
    }

    fn ranker(model: KeyedModel, threshold: f32) -> SimilarityRanker {
        SimilarityRanker::new(Arc::new(model), config(threshold))
    }

    #[tokio::test]
    async fn test_empty_batch_yields_empty_output() {
        let ranker = ranker(KeyedModel::default(), 0.9);
        let out = ranker.rank(Vec::new()).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_near_duplicates_suppressed() {
        // a and b are near-duplicates (similarity 0.95); c is unrelated.
        let a = article("http://x/a", "Story A", 2);
        let b = article("http://x/b", "Story B", 1);
        let c = article("http://x/c", "Story C", 1);
        let model = KeyedModel::default()
            .with(&a, vec![1.0, 0.0])
            .with(&b, vec![0.95, 0.312_25])
            .with(&c, vec![0.0, 1.0]);

        let ranker = ranker(model, 0.9);
        let out = ranker.rank(vec![a, b, c]).await.unwrap();

        let urls: Vec<&str> = out.iter().map(|a| a.url.as_str()).collect();
        let ab = urls
            .iter()
            .filter(|&&u| u == "http://x/a" || u == "http://x/b")
            .count();
        assert_eq!(ab, 1, "exactly one of the near-duplicates survives");
        assert!(urls.contains(&"http://x/c"));
        // Equal relevance: the earlier-fetched record wins.
        assert!(urls.contains(&"http://x/a"));
    }

    #[tokio::test]
    async fn test_output_is_subset_of_input() {
        let a = article("http://x/a", "Story A", 2);
        let b = article("http://x/b", "Story B", 1);
        let model = KeyedModel::default()
            .with(&a, vec![1.0, 0.0])
            .with(&b, vec![0.0, 1.0]);

        let ranker = ranker(model, 0.9);
        let input_urls: Vec<String> = vec![a.url.clone(), b.url.clone()];
        let out = ranker.rank(vec![a, b]).await.unwrap();
        assert!(out.iter().all(|a| input_urls.contains(&a.url)));
    }

    #[tokio::test]
    async fn test_pairwise_similarity_below_threshold() {
        let articles: Vec<Article> = (0..4)
            .map(|i| article(&format!("http://x/{}", i), &format!("Story {}", i), i))
            .collect();
        let vectors = [
            vec![1.0, 0.0, 0.0],
            vec![0.97, 0.243, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.97, 0.243],
        ];
        let mut model = KeyedModel::default();
        for (a, v) in articles.iter().zip(vectors.iter()) {
            model = model.with(a, v.clone());
        }

        let threshold = 0.9;
        let ranker = ranker(model, threshold);
        let out = ranker.rank(articles.clone()).await.unwrap();

        let index = SimilarityIndex::build(
            articles
                .iter()
                .zip(vectors.iter())
                .map(|(a, v)| (a.url.clone(), v.clone())),
        );
        for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                let sim = index.similarity(&out[i].url, &out[j].url).unwrap();
                assert!(sim < threshold, "accepted pair at similarity {}", sim);
            }
        }
    }

    #[tokio::test]
    async fn test_idempotent_for_same_batch() {
        let a = article("http://x/a", "Story A", 2);
        let b = article("http://x/b", "Story B", 1);
        let c = article("http://x/c", "Story C", 3);
        let model = || {
            KeyedModel::default()
                .with(&a, vec![1.0, 0.0])
                .with(&b, vec![0.95, 0.312_25])
                .with(&c, vec![0.0, 1.0])
        };

        let first = ranker(model(), 0.9)
            .rank(vec![a.clone(), b.clone(), c.clone()])
            .await
            .unwrap();
        let second = ranker(model(), 0.9)
            .rank(vec![a.clone(), b.clone(), c.clone()])
            .await
            .unwrap();

        let urls = |out: &[Article]| out.iter().map(|a| a.url.clone()).collect::<Vec<_>>();
        assert_eq!(urls(&first), urls(&second));
    }

    #[tokio::test]
    async fn test_threshold_zero_keeps_single_representative() {
        // Strictly-below acceptance: nothing has similarity below zero
        // against the first pick, so threshold 0 degenerates to one record.
        let a = article("http://x/a", "Story A", 1);
        let b = article("http://x/b", "Story B", 2);
        let model = KeyedModel::default()
            .with(&a, vec![1.0, 0.0])
            .with(&b, vec![0.0, 1.0]);

        let ranker = ranker(model, 0.0);
        let out = ranker.rank(vec![a, b]).await.unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_threshold_one_removes_only_exact_duplicates() {
        let a = article("http://x/a", "Story A", 1);
        let b = article("http://x/b", "Story B", 2);
        let c = article("http://x/c", "Story C", 3);
        let model = KeyedModel::default()
            .with(&a, vec![1.0, 0.0])
            .with(&b, vec![2.0, 0.0]) // same direction: similarity 1.0
            .with(&c, vec![0.95, 0.312_25]);

        let ranker = ranker(model, 1.0);
        let out = ranker.rank(vec![a, b, c]).await.unwrap();
        let urls: Vec<&str> = out.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(out.len(), 2);
        let exact_pair = urls
            .iter()
            .filter(|&&u| u == "http://x/a" || u == "http://x/b")
            .count();
        assert_eq!(exact_pair, 1, "only one of the exact duplicates survives");
        assert!(urls.contains(&"http://x/c"));
    }

    #[tokio::test]
    async fn test_failed_record_dropped_not_fatal() {
        let a = article("http://x/a", "Story A", 1);
        let b = article("http://x/b", "Story B", 2);
        // No vector registered for b: its embedding call fails.
        let model = KeyedModel::default().with(&a, vec![1.0, 0.0]);

        let ranker = ranker(model, 0.9);
        let out = ranker.rank(vec![a, b]).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://x/a");
    }

    #[tokio::test]
    async fn test_unreachable_service_aborts_run() {
        let a = article("http://x/a", "Story A", 1);
        let ranker = SimilarityRanker::new(Arc::new(UnreachableModel), config(0.9));
        let err = ranker.rank(vec![a]).await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_max_articles_cap() {
        let articles: Vec<Article> = (0..6)
            .map(|i| article(&format!("http://x/{}", i), &format!("Story {}", i), i))
            .collect();
        let mut model = KeyedModel::default();
        for (i, a) in articles.iter().enumerate() {
            let mut v = vec![0.0; 6];
            v[i] = 1.0;
            model = model.with(a, v);
        }

        let mut cfg = config(0.9);
        cfg.max_articles = 3;
        let ranker = SimilarityRanker::new(Arc::new(model), cfg);
        let out = ranker.rank(articles).await.unwrap();
        assert_eq!(out.len(), 3);
    }

    #[tokio::test]
    async fn test_stale_articles_dropped() {
        let fresh = article("http://x/fresh", "Fresh", 1);
        let stale = article("http://x/stale", "Stale", 24 * 30);
        let model = KeyedModel::default()
            .with(&fresh, vec![1.0, 0.0])
            .with(&stale, vec![0.0, 1.0]);

        let ranker = ranker(model, 0.9);
        let out = ranker.rank(vec![fresh, stale]).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "http://x/fresh");
    }

    #[tokio::test]
    async fn test_relevance_orders_output() {
        let mut relevant = article("http://x/ai", "AI breakthrough", 1);
        relevant.body = format!("technical {}", "word ".repeat(600));
        let plain = article("http://x/plain", "Weekly notes", 1);

        let model = KeyedModel::default()
            .with(&relevant, vec![1.0, 0.0])
            .with(&plain, vec![0.0, 1.0]);

        let ranker = ranker(model, 0.9);
        let out = ranker.rank(vec![plain, relevant]).await.unwrap();
        assert_eq!(out[0].url, "http://x/ai");
        assert_eq!(out[1].url, "http://x/plain");
    }
}
