//! Editing collaborator: delegates grammar and style checking to an
//! external LanguageTool-compatible service and applies the replacements it
//! returns. No rules are evaluated here.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use nl_core::{Correction, Editor, Error, Fix, Result};

const DEFAULT_BASE_URL: &str = "https://api.languagetool.org";

#[derive(Deserialize)]
struct CheckResponse {
    matches: Vec<LtMatch>,
}

#[derive(Deserialize)]
struct LtMatch {
    message: String,
    offset: usize,
    length: usize,
    replacements: Vec<Replacement>,
    rule: Rule,
}

#[derive(Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Deserialize)]
struct Rule {
    id: String,
}

pub struct LanguageToolEditor {
    client: Arc<Client>,
    base_url: String,
    language: String,
}

impl LanguageToolEditor {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: language.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn check(&self, text: &str) -> Result<Vec<LtMatch>> {
        let response = self
            .client
            .post(format!("{}/v2/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Editing(format!("{}: {}", status, body)));
        }

        let parsed = response
            .json::<CheckResponse>()
            .await
            .map_err(|e| Error::Editing(e.to_string()))?;
        Ok(parsed.matches)
    }
}

impl fmt::Debug for LanguageToolEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageToolEditor")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish()
    }
}

#[async_trait]
impl Editor for LanguageToolEditor {
    fn name(&self) -> &str {
        "LanguageTool"
    }

    async fn correct(&self, text: &str) -> Result<Correction> {
        let matches = self.check(text).await?;
        Ok(apply_matches(text, matches))
    }
}

/// Apply each match's best replacement, back to front so earlier offsets
/// stay valid. Offsets are in characters; matches without a replacement or
/// past the end of the text are skipped.
fn apply_matches(text: &str, mut matches: Vec<LtMatch>) -> Correction {
    matches.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut chars: Vec<char> = text.chars().collect();
    let mut fixes = Vec::new();

    for m in matches {
        let Some(replacement) = m.replacements.first() else {
            continue;
        };
        if m.offset + m.length > chars.len() {
            continue;
        }

        let tail: Vec<char> = chars.split_off(m.offset + m.length);
        chars.truncate(m.offset);
        chars.extend(replacement.value.chars());
        chars.extend(tail);

        fixes.push(Fix {
            message: m.message,
            offset: m.offset,
            length: m.length,
            replacement: replacement.value.clone(),
            rule_id: m.rule.id,
        });
    }

    fixes.reverse();
    Correction {
        text: chars.into_iter().collect(),
        fixes,
    }
}

/// Correct Markdown line by line, leaving fenced code blocks and headings
/// untouched so formatting survives the round trip.
pub async fn correct_markdown(editor: &dyn Editor, markdown: &str) -> Result<Correction> {
    let mut corrected_lines = Vec::new();
    let mut fixes = Vec::new();
    let mut in_code_block = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            corrected_lines.push(line.to_string());
            continue;
        }
        if in_code_block || line.trim_start().starts_with('#') || line.trim().is_empty() {
            corrected_lines.push(line.to_string());
            continue;
        }

        let correction = editor.correct(line).await?;
        corrected_lines.push(correction.text);
        fixes.extend(correction.fixes);
    }

    Ok(Correction {
        text: corrected_lines.join("\n"),
        fixes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt_match(offset: usize, length: usize, replacement: &str) -> LtMatch {
        LtMatch {
            message: "test".to_string(),
            offset,
            length,
            replacements: vec![Replacement {
                value: replacement.to_string(),
            }],
            rule: Rule {
                id: "TEST_RULE".to_string(),
            },
        }
    }

    #[test]
    fn test_apply_matches_in_reverse_order() {
        // "teh cat adn dog" -> "the cat and dog"
        let correction = apply_matches(
            "teh cat adn dog",
            vec![lt_match(0, 3, "the"), lt_match(8, 3, "and")],
        );
        assert_eq!(correction.text, "the cat and dog");
        assert_eq!(correction.fixes.len(), 2);
        assert_eq!(correction.fixes[0].offset, 0);
    }

    #[test]
    fn test_apply_matches_multibyte() {
        // Offsets count characters, not bytes.
        let correction = apply_matches("café iz open", vec![lt_match(5, 2, "is")]);
        assert_eq!(correction.text, "café is open");
    }

    #[test]
    fn test_match_without_replacement_skipped() {
        let mut m = lt_match(0, 3, "the");
        m.replacements.clear();
        let correction = apply_matches("teh cat", vec![m]);
        assert_eq!(correction.text, "teh cat");
        assert!(correction.fixes.is_empty());
    }

    #[test]
    fn test_out_of_bounds_match_skipped() {
        let correction = apply_matches("short", vec![lt_match(3, 10, "x")]);
        assert_eq!(correction.text, "short");
    }

    #[test]
    fn test_check_response_parsing() {
        let raw = r#"{
            "matches": [{
                "message": "Possible typo",
                "offset": 0,
                "length": 3,
                "replacements": [{"value": "the"}],
                "rule": {"id": "MORFOLOGIK_RULE_EN_US"}
            }]
        }"#;
        let parsed: CheckResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].rule.id, "MORFOLOGIK_RULE_EN_US");
    }

    /// Editor stub that fixes "teh" wherever it appears.
    #[derive(Debug)]
    struct TypoEditor;

    #[async_trait]
    impl Editor for TypoEditor {
        fn name(&self) -> &str {
            "typo"
        }

        async fn correct(&self, text: &str) -> Result<Correction> {
            let matches = text
                .char_indices()
                .filter(|(i, _)| text[*i..].starts_with("teh"))
                .map(|(i, _)| lt_match(text[..i].chars().count(), 3, "the"))
                .collect();
            Ok(apply_matches(text, matches))
        }
    }

    #[tokio::test]
    async fn test_correct_markdown_skips_code_and_headings() {
        let markdown = "# Teh heading stays\n\nteh body is fixed\n\n```\nteh code stays\n```\nteh tail is fixed";
        let correction = correct_markdown(&TypoEditor, markdown).await.unwrap();
        assert_eq!(
            correction.text,
            "# Teh heading stays\n\nthe body is fixed\n\n```\nteh code stays\n```\nthe tail is fixed"
        );
        assert_eq!(correction.fixes.len(), 2);
    }
}
