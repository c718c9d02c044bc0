//! Relevance scoring for ranking accepted records.

use chrono::{DateTime, Utc};

use nl_core::Article;

/// Score an article in [0, 1]. Keyword hits in the title, a preferred body
/// length, technical content and recency each contribute; the sum is
/// clamped. `reference` is captured once per run so a batch scores
/// consistently.
pub fn relevance_score(article: &Article, keywords: &[String], reference: DateTime<Utc>) -> f32 {
    let mut score = 0.0f32;

    let title = article.title.to_lowercase();
    for keyword in keywords {
        if title.contains(keyword.as_str()) {
            score += 0.2;
        }
    }

    // Prefer medium-length articles.
    let word_count = article.body.split_whitespace().count();
    if (500..=2000).contains(&word_count) {
        score += 0.3;
    }

    let body = article.body.to_lowercase();
    if body.contains("technical") || body.contains("algorithm") {
        score += 0.2;
    }

    let days_old = (reference - article.effective_date()).num_days();
    if days_old <= 2 {
        score += 0.3;
    } else if days_old <= 5 {
        score += 0.2;
    }

    score.min(1.0)
}
