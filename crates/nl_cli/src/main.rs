mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use nl_core::{Config, Editor, Error, Result};
use nl_editing::LanguageToolEditor;
use nl_fetch::SourceManager;
use nl_output::ExportFormat;

use pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about = "Newsletter generation pipeline", long_about = None)]
struct Cli {
    /// Inference model. Available models: dummy (default, offline), gemini
    #[arg(long, default_value = "dummy")]
    model: String,
    /// Duplicate-similarity threshold, within [0, 1]
    #[arg(long)]
    threshold: Option<f32>,
    /// Maximum number of articles in the newsletter
    #[arg(long)]
    max_articles: Option<usize>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Content source in format category=url-or-path (e.g. ai=feeds/ai.json).
    /// Repeatable.
    #[arg(long = "source", value_name = "CATEGORY=URL_OR_PATH")]
    sources: Vec<String>,
    /// Skip the external grammar check
    #[arg(long)]
    no_edit: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline and export the newsletter
    Run {
        /// Comma-separated export formats (markdown, html)
        #[arg(long, default_value = "markdown,html")]
        formats: String,
    },
    /// Fetch and rank only, printing the accepted articles
    Rank,
    /// List stored stage snapshots
    Snapshots,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(threshold) = cli.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "--threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        config.similarity_threshold = threshold;
    }
    if let Some(max_articles) = cli.max_articles {
        config.max_articles = max_articles;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    let mut sources = SourceManager::new();
    for spec in &cli.sources {
        sources.add_spec(spec)?;
    }
    if sources.is_empty() && !matches!(cli.command, Commands::Snapshots) {
        return Err(Error::Config(
            "no sources configured; pass at least one --source category=url-or-path".to_string(),
        ));
    }
    info!("🗞️ {} sources configured", sources.len());

    let model = nl_inference::create_model(&cli.model, &config)?;
    info!("🧠 Inference model initialized successfully (using {})", model.name());

    let editor: Option<Box<dyn Editor>> = if cli.no_edit {
        None
    } else {
        Some(Box::new(LanguageToolEditor::new(config.language.clone())))
    };

    let pipeline = Pipeline::new(&config, sources, model, editor);

    match cli.command {
        Commands::Run { formats } => {
            let formats = parse_formats(&formats)?;
            let written = pipeline.run(&formats).await?;
            if written.is_empty() {
                println!("No newsletter generated; nothing to publish.");
            } else {
                println!("Newsletter generated successfully!");
                for path in written {
                    println!("- {}", path.display());
                }
            }
        }
        Commands::Rank => {
            let ranked = pipeline.rank_only().await?;
            println!("Accepted {} articles:", ranked.len());
            for article in ranked {
                println!("- [{}] {} ({})", article.category, article.title, article.url);
            }
        }
        Commands::Snapshots => {
            for path in pipeline.snapshots()? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn parse_formats(raw: &str) -> Result<Vec<ExportFormat>> {
    let formats = raw
        .split(',')
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<ExportFormat>>>()?;
    if formats.is_empty() {
        return Err(Error::Export("no export formats given".to_string()));
    }
    Ok(formats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let formats = parse_formats("markdown, html").unwrap();
        assert_eq!(formats, vec![ExportFormat::Markdown, ExportFormat::Html]);
        assert!(parse_formats("pdf").is_err());
        assert!(parse_formats(" , ").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "nl",
            "--model",
            "dummy",
            "--threshold",
            "0.8",
            "--source",
            "ai=feeds/ai.json",
            "run",
            "--formats",
            "markdown",
        ]);
        assert_eq!(cli.model, "dummy");
        assert_eq!(cli.threshold, Some(0.8));
        assert_eq!(cli.sources.len(), 1);
        assert!(matches!(cli.command, Commands::Run { .. }));
    }
}
