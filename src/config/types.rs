//! Core configuration types for link rewriting
//!
//! This module contains the main `RewriteConfig` struct: the site the
//! articles were scraped from and the scraping exclusions that decide
//! which media links are archived.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Main configuration struct for link rewriting
///
/// Deserialization goes through [`RewriteConfig::builder`], so a config read
/// from JSON is normalized and validated like a built one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RewriteConfigFile")]
pub struct RewriteConfig {
    /// Site root used to absolutize root-relative external links.
    ///
    /// **INVARIANT:** always ends with `/` (normalized in builder).
    pub(crate) base_url: Url,

    /// Article URL prefix (`https://en.wikipedia.org/wiki/`).
    ///
    /// Its scheme resolves protocol-relative links and its path is the
    /// article path stripped from wikilinks.
    pub(crate) web_url: Url,

    /// Do not archive PDF documents
    pub(crate) exclude_pdf: bool,

    /// Do not archive images
    pub(crate) exclude_images: bool,

    /// Do not archive videos
    pub(crate) exclude_videos: bool,

    /// Do not archive detail pages (media description content)
    pub(crate) exclude_details: bool,

    /// Maximum documents resolved against the index at the same time
    /// Default: 32
    pub(crate) max_concurrent_documents: Option<usize>,
}

/// On-disk JSON form of [`RewriteConfig`].
///
/// Only `base_url` is required; everything else falls back to the builder
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RewriteConfigFile {
    base_url: String,
    web_url: Option<String>,
    exclude_pdf: bool,
    exclude_images: bool,
    exclude_videos: bool,
    exclude_details: bool,
    max_concurrent_documents: Option<usize>,
}

impl RewriteConfig {
    /// Parse a JSON configuration document
    ///
    /// # Example
    /// ```rust
    /// # use zim_link_rewriter::config::RewriteConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = RewriteConfig::from_json(r#"{
    ///     "base_url": "https://fr.wikipedia.org",
    ///     "exclude_pdf": true
    /// }"#)?;
    /// assert!(config.exclude_pdf());
    /// assert_eq!(config.web_url().as_str(), "https://fr.wikipedia.org/wiki/");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid rewrite configuration JSON")
    }

    /// Load a JSON configuration file
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&json)
    }
}

impl TryFrom<RewriteConfigFile> for RewriteConfig {
    type Error = anyhow::Error;

    fn try_from(file: RewriteConfigFile) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(file.base_url)
            .exclude_pdf(file.exclude_pdf)
            .exclude_images(file.exclude_images)
            .exclude_videos(file.exclude_videos)
            .exclude_details(file.exclude_details);
        if let Some(web_url) = file.web_url {
            builder = builder.web_url(web_url);
        }
        if let Some(max) = file.max_concurrent_documents {
            builder = builder.max_concurrent_documents(max);
        }
        builder.build()
    }
}
