use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// One fetched piece of content. Immutable once fetched; `summary` is the
/// only field filled in later, by the summarization stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Article {
    /// Text submitted to the embedding model: title and body combined.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// Publication date when the source provided one, fetch time otherwise.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.fetched_at)
    }
}

/// Source category an article was fetched under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AI")]
    Ai,
    ProductManagement,
    GeneralTech,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Ai,
        Category::ProductManagement,
        Category::GeneralTech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::ProductManagement => "ProductManagement",
            Category::GeneralTech => "GeneralTech",
        }
    }

    /// Section heading used when assembling the newsletter.
    pub fn section_title(&self) -> &'static str {
        match self {
            Category::Ai => "AI & Machine Learning",
            Category::ProductManagement => "Product Management",
            Category::GeneralTech => "General Technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Ok(Category::Ai),
            "productmanagement" | "product-management" | "product" => {
                Ok(Category::ProductManagement)
            }
            "generaltech" | "general-tech" | "general" => Ok(Category::GeneralTech),
            other => Err(Error::Config(format!("unknown category: {}", other))),
        }
    }
}

/// Result of running text through the editing collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub text: String,
    pub fixes: Vec<Fix>,
}

impl Correction {
    /// A correction that leaves the text untouched.
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fixes: Vec::new(),
        }
    }
}

/// A single replacement the editing service applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fix {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub replacement: String,
    pub rule_id: String,
}
