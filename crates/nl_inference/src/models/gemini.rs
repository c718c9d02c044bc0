use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use nl_core::{Article, Error, InferenceModel, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GENERATION_MODEL: &str = "gemini-pro";
const EMBEDDING_MODEL: &str = "text-embedding-004";
const LLM_TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 1000;

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl GeminiModel {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is required for gemini".to_string()))?;
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate_embeddings(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: format!("models/{}", EMBEDDING_MODEL),
            content: EmbedContent {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:embedContent?key={}",
                self.base_url, EMBEDDING_MODEL, self.api_key
            ))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    Error::EmbeddingUnavailable(e.to_string())
                } else {
                    Error::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmbeddingFailed(format!("{}: {}", status, body)));
        }

        let parsed = response
            .json::<EmbedResponse>()
            .await
            .map_err(|e| Error::EmbeddingFailed(e.to_string()))?;

        Ok(parsed.embedding.values)
    }

    async fn summarize_article(&self, article: &Article) -> Result<String> {
        let prompt = format!(
            "Please summarize the following article:\n\nTitle: {}\n\nContent: {}\n\nSummary:",
            article.title, article.body
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: LLM_TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, GENERATION_MODEL, self.api_key
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("{}: {}", status, body)));
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::Inference(e.to_string()))?;

        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .ok_or_else(|| Error::Inference("empty generation response".to_string()))
    }
}
