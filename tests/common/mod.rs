//! Test utilities and helper functions for the link rewriter test suite

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use zim_link_rewriter::{ArticleIndex, IndexError, IndexResult, RedirectIndex, RewriteConfig};

/// Creates a test HTML document with specified content
#[allow(dead_code)]
pub fn create_test_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Configuration for en.wikipedia.org with every media kind scraped
#[allow(dead_code)]
pub fn wikipedia_config() -> RewriteConfig {
    RewriteConfig::builder()
        .base_url("https://en.wikipedia.org")
        .build()
        .expect("valid test config")
}

/// Lookup received by a [`MemoryIndex`]
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Mirrored(Vec<String>),
    Redirects(Vec<String>),
}

/// In-memory archive index recording every lookup it receives
#[derive(Debug, Default)]
pub struct MemoryIndex {
    articles: HashSet<String>,
    redirects: HashMap<String, String>,
    lookups: Mutex<Vec<Lookup>>,
}

#[allow(dead_code)]
impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(mut self, titles: &[&str]) -> Self {
        self.articles.extend(titles.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_redirect(mut self, title: &str, target: &str) -> Self {
        self.redirects.insert(title.to_string(), target.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<Lookup> {
        self.lookups.lock().expect("lookup log poisoned").clone()
    }

    fn record(&self, lookup: Lookup) {
        self.lookups.lock().expect("lookup log poisoned").push(lookup);
    }
}

impl ArticleIndex for MemoryIndex {
    async fn mirrored(&self, titles: &[String]) -> IndexResult<HashSet<String>> {
        self.record(Lookup::Mirrored(titles.to_vec()));
        Ok(titles
            .iter()
            .filter(|t| self.articles.contains(*t))
            .cloned()
            .collect())
    }
}

impl RedirectIndex for MemoryIndex {
    async fn redirect_targets(&self, titles: &[String]) -> IndexResult<HashMap<String, String>> {
        self.record(Lookup::Redirects(titles.to_vec()));
        Ok(titles
            .iter()
            .filter_map(|t| self.redirects.get(t).map(|target| (t.clone(), target.clone())))
            .collect())
    }
}

/// Index whose lookups always fail
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FailingIndex;

impl ArticleIndex for FailingIndex {
    async fn mirrored(&self, _titles: &[String]) -> IndexResult<HashSet<String>> {
        Err(IndexError::Other("index unavailable".to_string()))
    }
}

impl RedirectIndex for FailingIndex {
    async fn redirect_targets(&self, _titles: &[String]) -> IndexResult<HashMap<String, String>> {
        Err(IndexError::Other("index unavailable".to_string()))
    }
}
