use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.9;
const DEFAULT_MAX_ARTICLES: usize = 5;
const DEFAULT_MAX_AGE_DAYS: i64 = 7;
const DEFAULT_LANGUAGE: &str = "en-US";

/// Runtime configuration, read from the environment. CLI flags override
/// individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub similarity_threshold: f32,
    pub max_articles: usize,
    pub max_age_days: i64,
    pub keywords: Vec<String>,
    pub language: String,
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::try_load_dotenv();

        let similarity_threshold = match env::var("NL_SIMILARITY_THRESHOLD") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|_| Error::Config(format!("invalid NL_SIMILARITY_THRESHOLD: {}", raw)))?,
            Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
        };
        if !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(Error::Config(format!(
                "NL_SIMILARITY_THRESHOLD must be within [0, 1], got {}",
                similarity_threshold
            )));
        }

        let max_articles = match env::var("NL_MAX_ARTICLES") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|_| Error::Config(format!("invalid NL_MAX_ARTICLES: {}", raw)))?,
            Err(_) => DEFAULT_MAX_ARTICLES,
        };

        let max_age_days = match env::var("NL_MAX_AGE_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::Config(format!("invalid NL_MAX_AGE_DAYS: {}", raw)))?,
            Err(_) => DEFAULT_MAX_AGE_DAYS,
        };

        let keywords = match env::var("NL_KEYWORDS") {
            Ok(raw) => parse_keywords(&raw),
            Err(_) => default_keywords(),
        };

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            similarity_threshold,
            max_articles,
            max_age_days,
            keywords,
            language: env::var("NL_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
            output_dir: env::var("NL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            data_dir: env::var("NL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/newsletter/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("newsletter").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
        // Nothing found is fine; variables may be set system-wide.
    }
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn default_keywords() -> Vec<String> {
    [
        "ai",
        "machine learning",
        "deep learning",
        "product management",
        "agile",
        "innovation",
        "technology",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}
