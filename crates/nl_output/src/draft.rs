use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use nl_core::{Article, Category};

/// Assembled newsletter ready for editing and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newsletter {
    pub content: String,
    pub metadata: NewsletterMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterMeta {
    pub issue_date: NaiveDate,
    pub article_count: usize,
}

/// Compose the newsletter Markdown from ranked, summarized articles:
/// a dated title, a table of contents, then one section per category in a
/// fixed order, preserving the ranker's ordering inside each section.
pub fn compose(articles: &[Article], issue_date: NaiveDate) -> Newsletter {
    let mut sections: Vec<(&'static str, Vec<&Article>)> = Vec::new();
    for category in Category::ALL {
        let items: Vec<&Article> = articles
            .iter()
            .filter(|a| a.category == category)
            .collect();
        if !items.is_empty() {
            sections.push((category.section_title(), items));
        }
    }

    let mut toc = String::from("## In this issue\n\n");
    for (title, _) in &sections {
        toc.push_str(&format!("- [{}](#{})\n", title, anchor(title)));
    }

    let mut body = String::new();
    for (title, items) in &sections {
        body.push_str(&format!(
            "\n## {} <a name='{}'></a>\n\n",
            title,
            anchor(title)
        ));
        for article in items {
            body.push_str(&format!(
                "### {}\n\n{}\n\n[Read more]({})\n\n",
                article.title,
                article.summary.as_deref().unwrap_or("No summary available."),
                article.url
            ));
        }
    }

    let content = format!(
        "# Tech Newsletter - {}\n\n{}{}",
        issue_date.format("%Y-%m-%d"),
        toc,
        body
    );

    Newsletter {
        content,
        metadata: NewsletterMeta {
            issue_date,
            article_count: articles.len(),
        },
    }
}

fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .replace(' ', "-")
        .replace([':', '?', '&'], "")
}
