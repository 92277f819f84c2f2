//! zim-link-rewriter - rewrite the links of scraped wiki articles for a ZIM archive

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use zim_link_rewriter::{RewriteConfig, RewriteStats, SqliteArchiveIndex, rewrite_article};

#[derive(Parser, Debug)]
#[command(name = "zim-link-rewriter")]
#[command(version, about = "Rewrite wiki article links for offline ZIM archives", long_about = None)]
#[command(after_help = "EXAMPLES:
    zim-link-rewriter index --index-dir out add-article Animation Real-time_rendering
    zim-link-rewriter index --index-dir out add-redirect Real-time_computer_graphics Real-time_rendering
    zim-link-rewriter rewrite --index-dir out --base-url en.wikipedia.org --article-id Animation -i Animation.html")]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite the links of one article
    Rewrite(RewriteArgs),

    /// Register articles and redirects in the archive index
    Index {
        /// Directory holding the archive index
        #[arg(long, value_name = "DIR")]
        index_dir: PathBuf,

        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Args, Debug)]
struct RewriteArgs {
    /// Directory holding the archive index
    #[arg(long, value_name = "DIR")]
    index_dir: PathBuf,

    /// Id of the article inside the archive (`Paris`, `AC/DC`)
    #[arg(long)]
    article_id: String,

    /// Article HTML
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the rewritten HTML (defaults to the input file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON rewrite configuration
    #[arg(long, value_name = "FILE", required_unless_present = "base_url")]
    config: Option<PathBuf>,

    /// Site the article was scraped from
    #[arg(long, value_name = "URL", conflicts_with = "config")]
    base_url: Option<String>,

    /// Article URL prefix (defaults to `{base_url}/wiki/`)
    #[arg(long, value_name = "URL", conflicts_with = "config")]
    web_url: Option<String>,

    /// Do not archive PDF documents
    #[arg(long, conflicts_with = "config")]
    exclude_pdf: bool,

    /// Do not archive images
    #[arg(long, conflicts_with = "config")]
    exclude_images: bool,

    /// Do not archive videos
    #[arg(long, conflicts_with = "config")]
    exclude_videos: bool,

    /// Do not archive media detail pages
    #[arg(long, conflicts_with = "config")]
    exclude_details: bool,
}

#[derive(Subcommand, Debug)]
enum IndexAction {
    /// Register articles written to the archive
    AddArticle {
        #[arg(required = true, value_name = "TITLE")]
        titles: Vec<String>,
    },

    /// Register a redirect
    AddRedirect {
        #[arg(value_name = "FROM")]
        title: String,
        #[arg(value_name = "TO")]
        target: String,
    },

    /// Show index counts
    Stats,
}

/// What `rewrite` prints on stdout
#[derive(Serialize)]
struct RewriteReport<'a> {
    article_id: &'a str,
    media_dependencies: Vec<String>,
    stats: RewriteStats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let outcome = match cli.command {
        Command::Rewrite(args) => run_rewrite(args).await,
        Command::Index { index_dir, action } => run_index(&index_dir, action).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

impl RewriteArgs {
    async fn load_config(&self) -> Result<RewriteConfig> {
        if let Some(path) = &self.config {
            return RewriteConfig::from_json_file(path).await;
        }

        let base_url = self
            .base_url
            .clone()
            .context("either --config or --base-url is required")?;
        let mut builder = RewriteConfig::builder()
            .base_url(base_url)
            .exclude_pdf(self.exclude_pdf)
            .exclude_images(self.exclude_images)
            .exclude_videos(self.exclude_videos)
            .exclude_details(self.exclude_details);
        if let Some(web_url) = &self.web_url {
            builder = builder.web_url(web_url.clone());
        }
        builder.build()
    }
}

async fn run_rewrite(args: RewriteArgs) -> Result<()> {
    let config = args.load_config().await?;

    let html = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let (rewritten, result) =
        rewrite_article(config, &args.index_dir, &args.article_id, &html).await?;

    let output = args.output.as_ref().unwrap_or(&args.input);
    tokio::fs::write(output, rewritten)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let report = RewriteReport {
        article_id: &args.article_id,
        media_dependencies: result.media_dependencies,
        stats: result.stats,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_index(index_dir: &Path, action: IndexAction) -> Result<()> {
    let index = SqliteArchiveIndex::open(index_dir)
        .await
        .context("Failed to open archive index")?;

    match action {
        IndexAction::AddArticle { titles } => {
            index.register_articles(&titles).await?;
            log::info!("Registered {} articles", titles.len());
        }
        IndexAction::AddRedirect { title, target } => {
            index.register_redirect(&title, &target).await?;
            log::info!("Registered redirect {title} -> {target}");
        }
        IndexAction::Stats => {
            println!("articles: {}", index.article_count().await?);
            println!("redirects: {}", index.redirect_count().await?);
        }
    }

    index.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_rewrite_args() {
        let cli = Cli::try_parse_from([
            "zim-link-rewriter",
            "rewrite",
            "--index-dir",
            "out",
            "--base-url",
            "en.wikipedia.org",
            "--article-id",
            "AC/DC",
            "-i",
            "AC_DC.html",
            "--exclude-pdf",
        ])
        .unwrap();

        let Command::Rewrite(args) = cli.command else {
            panic!("expected rewrite command");
        };
        assert_eq!(args.article_id, "AC/DC");
        assert_eq!(args.base_url.as_deref(), Some("en.wikipedia.org"));
        assert!(args.exclude_pdf);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_cli_rewrite_requires_site() {
        let result = Cli::try_parse_from([
            "zim-link-rewriter",
            "rewrite",
            "--index-dir",
            "out",
            "--article-id",
            "Paris",
            "-i",
            "Paris.html",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "zim-link-rewriter",
            "rewrite",
            "--index-dir",
            "out",
            "--article-id",
            "Paris",
            "-i",
            "Paris.html",
            "--config",
            "wiki.json",
            "--exclude-images",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_index_actions() {
        let cli = Cli::try_parse_from([
            "zim-link-rewriter",
            "-v",
            "index",
            "--index-dir",
            "out",
            "add-redirect",
            "Real-time_computer_graphics",
            "Real-time_rendering",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Index {
                action: IndexAction::AddRedirect { title, target },
                ..
            } => {
                assert_eq!(title, "Real-time_computer_graphics");
                assert_eq!(target, "Real-time_rendering");
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["zim-link-rewriter", "index", "--index-dir", "out", "add-article"]);
        assert!(cli.is_err());
    }

    #[tokio::test]
    async fn test_load_config_from_flags() {
        let cli = Cli::try_parse_from([
            "zim-link-rewriter",
            "rewrite",
            "--index-dir",
            "out",
            "--base-url",
            "fr.wikipedia.org",
            "--article-id",
            "Paris",
            "-i",
            "Paris.html",
            "--exclude-videos",
        ])
        .unwrap();
        let Command::Rewrite(args) = cli.command else {
            panic!("expected rewrite command");
        };

        let config = args.load_config().await.unwrap();
        assert_eq!(config.base_url().as_str(), "https://fr.wikipedia.org/");
        assert!(config.exclude_videos());
        assert!(!config.exclude_pdf());
    }
}
