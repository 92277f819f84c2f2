//! Type-safe builder for `RewriteConfig` using the typestate pattern
//!
//! The site base URL is the only required field; `build()` exists only once
//! it has been set.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use url::Url;

use super::types::RewriteConfig;
use crate::utils::DEFAULT_ARTICLE_PATH;

/// Normalize a site URL: add `https://` when no scheme is present and make
/// sure the path ends with `/` so `Url::join` keeps the last segment.
fn normalize_site_url(raw: &str, field: &str) -> Result<Url> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| anyhow!("Invalid {field} '{raw}': {e}"))?;
    if url.host_str().is_none() {
        return Err(anyhow!("Invalid {field} '{raw}': no host"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// Type states for the builder
pub struct WithBaseUrl;

pub struct RewriteConfigBuilder<State = ()> {
    pub(crate) base_url: Option<String>,
    pub(crate) web_url: Option<String>,
    pub(crate) exclude_pdf: bool,
    pub(crate) exclude_images: bool,
    pub(crate) exclude_videos: bool,
    pub(crate) exclude_details: bool,
    pub(crate) max_concurrent_documents: Option<usize>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for RewriteConfigBuilder<()> {
    fn default() -> Self {
        Self {
            base_url: None,
            web_url: None,
            exclude_pdf: false,
            exclude_images: false,
            exclude_videos: false,
            exclude_details: false,
            max_concurrent_documents: None,
            _phantom: PhantomData,
        }
    }
}

impl RewriteConfig {
    /// Create a builder for configuring a `RewriteConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> RewriteConfigBuilder<()> {
        RewriteConfigBuilder::default()
    }
}

impl RewriteConfigBuilder<()> {
    pub fn base_url(self, url: impl Into<String>) -> RewriteConfigBuilder<WithBaseUrl> {
        RewriteConfigBuilder {
            base_url: Some(url.into()),
            web_url: self.web_url,
            exclude_pdf: self.exclude_pdf,
            exclude_images: self.exclude_images,
            exclude_videos: self.exclude_videos,
            exclude_details: self.exclude_details,
            max_concurrent_documents: self.max_concurrent_documents,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when the base URL is set
impl RewriteConfigBuilder<WithBaseUrl> {
    pub fn build(self) -> Result<RewriteConfig> {
        let raw_base = self
            .base_url
            .ok_or_else(|| anyhow!("base_url is required"))?;
        let base_url = normalize_site_url(&raw_base, "base_url")?;

        let web_url = match self.web_url {
            Some(raw_web) => normalize_site_url(&raw_web, "web_url")?,
            None => base_url
                .join(DEFAULT_ARTICLE_PATH)
                .map_err(|e| anyhow!("Cannot derive web_url from '{base_url}': {e}"))?,
        };

        if self.max_concurrent_documents == Some(0) {
            return Err(anyhow!("max_concurrent_documents must be at least 1"));
        }

        Ok(RewriteConfig {
            base_url,
            web_url,
            exclude_pdf: self.exclude_pdf,
            exclude_images: self.exclude_images,
            exclude_videos: self.exclude_videos,
            exclude_details: self.exclude_details,
            max_concurrent_documents: self.max_concurrent_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(
            normalize_site_url("en.wikipedia.org", "base_url").unwrap().as_str(),
            "https://en.wikipedia.org/"
        );
        assert_eq!(
            normalize_site_url("http://wiki.local/w", "base_url").unwrap().as_str(),
            "http://wiki.local/w/"
        );
        assert!(normalize_site_url("https://", "base_url").is_err());
    }
}
