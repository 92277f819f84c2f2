//! MediaWiki title decoding.
//!
//! Converts hrefs found in Parsoid or action-API HTML into canonical page
//! titles, and titles back into the ids used inside the archive's HTML.

use url::Url;

use crate::config::RewriteConfig;
use crate::utils::encode_uri_component;

/// Maps hrefs to canonical titles and titles to archive URLs.
pub trait TitleDecoder {
    /// Canonical page title targeted by `href`, or `None` when the href does
    /// not point at an article of this wiki.
    fn extract_page_title_from_href(&self, href: &str) -> Option<String>;

    /// Id of `title` as written in archive HTML hrefs.
    fn encode_article_id_for_zim_html_url(&self, title: &str) -> String;
}

/// Title decoder for a MediaWiki site, driven by its article path.
#[derive(Debug, Clone)]
pub struct MediaWiki {
    article_path: String,
}

impl MediaWiki {
    /// Create a decoder for wikis whose articles live under `article_path`
    /// (`"/wiki/"`).
    #[must_use]
    pub fn new(article_path: impl Into<String>) -> Self {
        Self {
            article_path: article_path.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new(config.article_path())
    }

    #[must_use]
    pub fn article_path(&self) -> &str {
        &self.article_path
    }
}

/// Path component of an href: query and fragment removed, scheme and
/// authority removed for absolute and protocol-relative URLs.
fn href_pathname(href: &str) -> String {
    if let Ok(url) = Url::parse(href) {
        return url.path().to_string();
    }

    let path = href.split(['?', '#']).next().unwrap_or_default();
    match path.strip_prefix("//") {
        Some(rest) => rest
            .find('/')
            .map(|idx| rest[idx..].to_string())
            .unwrap_or_default(),
        None => path.to_string(),
    }
}

impl TitleDecoder for MediaWiki {
    fn extract_page_title_from_href(&self, href: &str) -> Option<String> {
        let pathname = href_pathname(href);

        let raw_title = if let Some(rest) = pathname.strip_prefix("./") {
            rest
        } else if let Some(rest) = pathname.strip_prefix(self.article_path.as_str()) {
            rest
        } else {
            // Interwiki or non-article link
            return None;
        };

        match urlencoding::decode(raw_title) {
            Ok(title) if !title.is_empty() => Some(title.into_owned()),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Unable to decode title from href {href}: {e}");
                None
            }
        }
    }

    fn encode_article_id_for_zim_html_url(&self, title: &str) -> String {
        encode_uri_component(title)
    }
}
