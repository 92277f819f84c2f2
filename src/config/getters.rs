//! Getter methods for `RewriteConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from a `RewriteConfig` instance.

use url::Url;

use super::types::RewriteConfig;
use crate::utils::DEFAULT_MAX_CONCURRENT_DOCUMENTS;

impl RewriteConfig {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn web_url(&self) -> &Url {
        &self.web_url
    }

    /// Protocol of the wiki, with its trailing colon (`"https:"`)
    ///
    /// Prepended to protocol-relative links (`//upload.wikimedia.org/...`).
    #[must_use]
    pub fn web_protocol(&self) -> String {
        format!("{}:", self.web_url.scheme())
    }

    /// Path prefix of article URLs (`"/wiki/"`)
    #[must_use]
    pub fn article_path(&self) -> &str {
        self.web_url.path()
    }

    #[must_use]
    pub fn exclude_pdf(&self) -> bool {
        self.exclude_pdf
    }

    #[must_use]
    pub fn exclude_images(&self) -> bool {
        self.exclude_images
    }

    #[must_use]
    pub fn exclude_videos(&self) -> bool {
        self.exclude_videos
    }

    #[must_use]
    pub fn exclude_details(&self) -> bool {
        self.exclude_details
    }

    /// Get the bound on documents resolved concurrently
    ///
    /// Returns the configured bound, or 32 if not set.
    #[must_use]
    pub fn max_concurrent_documents(&self) -> usize {
        self.max_concurrent_documents
            .unwrap_or(DEFAULT_MAX_CONCURRENT_DOCUMENTS)
    }
}
