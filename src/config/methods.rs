//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use super::builder::RewriteConfigBuilder;

impl<State> RewriteConfigBuilder<State> {
    /// Set the article URL prefix
    ///
    /// Defaults to `{base_url}wiki/`. Wikis with a different article path
    /// (`/w/`, `/index.php/`) must set it, otherwise no wikilink title can be
    /// extracted.
    ///
    /// # Example
    /// ```rust
    /// # use zim_link_rewriter::config::RewriteConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = RewriteConfig::builder()
    ///     .base_url("https://wiki.example.org")
    ///     .web_url("https://wiki.example.org/index.php/")
    ///     .build()?;
    /// assert_eq!(config.article_path(), "/index.php/");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn exclude_pdf(mut self, exclude: bool) -> Self {
        self.exclude_pdf = exclude;
        self
    }

    #[must_use]
    pub fn exclude_images(mut self, exclude: bool) -> Self {
        self.exclude_images = exclude;
        self
    }

    #[must_use]
    pub fn exclude_videos(mut self, exclude: bool) -> Self {
        self.exclude_videos = exclude;
        self
    }

    #[must_use]
    pub fn exclude_details(mut self, exclude: bool) -> Self {
        self.exclude_details = exclude;
        self
    }

    /// Bound the number of documents resolved against the index at once
    ///
    /// Only used by [`LinkRewriter::rewrite_documents`](crate::LinkRewriter::rewrite_documents).
    #[must_use]
    pub fn max_concurrent_documents(mut self, max: usize) -> Self {
        self.max_concurrent_documents = Some(max);
        self
    }
}
