use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use nl_core::{Error, Result};

use crate::draft::Newsletter;

const DEFAULT_RETENTION_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            other => Err(Error::Export(format!("unknown export format: {}", other))),
        }
    }
}

/// Writes newsletter files into the output directory and prunes old issues.
pub struct Exporter {
    output_dir: PathBuf,
    retention: Duration,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            retention: Duration::from_secs(DEFAULT_RETENTION_DAYS * 24 * 3600),
        }
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention = Duration::from_secs(days * 24 * 3600);
        self
    }

    /// Write the newsletter in each requested format. Returns the paths
    /// written.
    pub fn export(&self, newsletter: &Newsletter, formats: &[ExportFormat]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let stem = format!("newsletter-{}", newsletter.metadata.issue_date.format("%Y-%m-%d"));
        let mut written = Vec::with_capacity(formats.len());

        for format in formats {
            let path = self.output_dir.join(format!("{}.{}", stem, format.extension()));
            let payload = match format {
                ExportFormat::Markdown => newsletter.content.clone(),
                ExportFormat::Html => to_html(&newsletter.content),
            };
            fs::write(&path, payload)?;
            info!("📄 Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Remove exports older than the retention window. Returns how many
    /// files were removed.
    pub fn clean_old_exports(&self) -> Result<usize> {
        if !self.output_dir.exists() {
            return Ok(0);
        }

        let now = SystemTime::now();
        let mut removed = 0;

        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !is_export_file(&path) {
                continue;
            }

            let modified = entry.metadata().and_then(|m| m.modified());
            let age = match modified {
                Ok(modified) => now.duration_since(modified).unwrap_or_default(),
                Err(e) => {
                    warn!("🧹 Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if age > self.retention {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("🧹 Removed {} old exports", removed);
        }
        Ok(removed)
    }
}

fn is_export_file(path: &Path) -> bool {
    let named_like_export = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("newsletter-"))
        .unwrap_or(false);
    let known_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "html")
        .unwrap_or(false);
    named_like_export && known_extension
}

/// Line-level Markdown rendering: headings, lists, fenced code and inline
/// links/bold. This is a pass-through for our own generated Markdown, not a
/// general Markdown engine.
pub fn to_html(markdown: &str) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Newsletter</title>\n</head>\n<body>\n",
    );

    let mut in_code_block = false;
    let mut in_list = false;
    let mut paragraph: Vec<String> = Vec::new();

    fn flush_paragraph(html: &mut String, paragraph: &mut Vec<String>) {
        if !paragraph.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", paragraph.join(" ")));
            paragraph.clear();
        }
    }

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            flush_paragraph(&mut html, &mut paragraph);
            html.push_str(if in_code_block { "</code></pre>\n" } else { "<pre><code>" });
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            html.push_str(&escape(line));
            html.push('\n');
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush_paragraph(&mut html, &mut paragraph);
            if in_list {
                html.push_str("</ul>\n");
                in_list = false;
            }
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            flush_paragraph(&mut html, &mut paragraph);
            if !in_list {
                html.push_str("<ul>\n");
                in_list = true;
            }
            html.push_str(&format!("<li>{}</li>\n", inline(item)));
            continue;
        }
        if in_list {
            html.push_str("</ul>\n");
            in_list = false;
        }

        if let Some(heading) = trimmed.strip_prefix("### ") {
            flush_paragraph(&mut html, &mut paragraph);
            html.push_str(&format!("<h3>{}</h3>\n", inline(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            flush_paragraph(&mut html, &mut paragraph);
            html.push_str(&format!("<h2>{}</h2>\n", inline(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            flush_paragraph(&mut html, &mut paragraph);
            html.push_str(&format!("<h1>{}</h1>\n", inline(heading)));
        } else {
            paragraph.push(inline(trimmed));
        }
    }

    flush_paragraph(&mut html, &mut paragraph);
    if in_list {
        html.push_str("</ul>\n");
    }
    if in_code_block {
        html.push_str("</code></pre>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Convert inline links and bold spans. Anchors in our generated headings
/// are already HTML and pass through unchanged.
fn inline(text: &str) -> String {
    let mut out = text.to_string();

    // [label](url) -> <a href="url">label</a>
    loop {
        let Some(start) = out.find('[') else { break };
        let Some(mid) = out[start..].find("](").map(|i| start + i) else {
            break;
        };
        let Some(end) = out[mid..].find(')').map(|i| mid + i) else {
            break;
        };
        let label = out[start + 1..mid].to_string();
        let url = out[mid + 2..end].to_string();
        out = format!(
            "{}<a href=\"{}\">{}</a>{}",
            &out[..start],
            url,
            label,
            &out[end + 1..]
        );
    }

    // **bold** -> <strong>bold</strong>
    while let Some(start) = out.find("**") {
        let Some(end) = out[start + 2..].find("**").map(|i| start + 2 + i) else {
            break;
        };
        let bold = out[start + 2..end].to_string();
        out = format!(
            "{}<strong>{}</strong>{}",
            &out[..start],
            bold,
            &out[end + 2..]
        );
    }

    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
