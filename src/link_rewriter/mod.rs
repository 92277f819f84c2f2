//! Link rewriter for wiki articles bound for a ZIM archive.
//!
//! Every `<a>` and `<area>` of an article goes through the same pipeline:
//! 1. Classify the link (protocol, `rel` inference, empty and fragment hrefs)
//! 2. Rewrite map links to `geo:` URIs, media links into the media namespace
//!    and external links to absolute URLs (all synchronous)
//! 3. Group wikilinks by target title
//! 4. Resolve the titles against the archive index (mirrored, redirect or
//!    unwrapped)
//! 5. Prefix the surviving wikilinks for articles living in sub-directories
//!
//! Only step 4 awaits; a failing lookup aborts the document.

mod classifier;
mod depth;
mod external;
mod geo;
mod media;
mod resolution;
mod wikilink;

use std::collections::HashSet;
use std::sync::Arc;

use kuchiki::NodeRef;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::config::RewriteConfig;
use crate::dom::{LinkNode, collect_link_nodes, parse_document, serialize_document};
use crate::error::{IndexError, RewriteError};
use crate::link_index::{ArticleIndex, RedirectIndex};
use crate::mediawiki::{MediaWiki, TitleDecoder};

pub use classifier::{Classification, ClassifiedLink, LinkIntent, classify};
pub use depth::{depth_prefix, normalize_depth};
pub use external::{ExternalOutcome, rewrite_external_link};
pub use geo::{GeoCoordinate, GeoDialect, detect_dialect, extract_coordinates};
pub use media::{MediaOutcome, is_scrapeable, rewrite_media_link};
pub use resolution::{ResolutionSummary, resolve_wikilinks};
pub use wikilink::{WikilinkMapping, rewrite_wikilink};

/// Counters for one rewrite invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Map links replaced by `geo:` URIs
    pub geo: usize,
    /// Media links pointed into the archive
    pub media: usize,
    /// Media links without computable archive path (also counted in `deleted`)
    pub media_failed: usize,
    /// External and interwiki links processed
    pub external: usize,
    /// Wikilinks grouped for resolution
    pub wikilinks: usize,
    /// Distinct titles found in the archive
    pub mirrored: usize,
    /// Wikilinks pointed at a redirect target
    pub redirected: usize,
    /// Links replaced by their content
    pub unwrapped: usize,
    /// Links removed with their content
    pub deleted: usize,
}

/// Result of rewriting a set of link nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteResult {
    /// Original URLs of the media files the rewritten links now point at,
    /// in encounter order (duplicates kept)
    pub media_dependencies: Vec<String>,
    pub stats: RewriteStats,
}

/// Result of rewriting a whole document.
pub struct DocumentRewrite {
    /// The rewritten document (same tree that was passed in)
    pub document: NodeRef,
    pub media_dependencies: Vec<String>,
    pub stats: RewriteStats,
}

/// Rewrites the links of wiki articles for the archive.
///
/// Holds the site configuration, the title decoder and a shared archive
/// index. Cloning is cheap; clones share the index and the concurrency
/// bound of [`rewrite_documents`](Self::rewrite_documents).
pub struct LinkRewriter<D, I> {
    config: Arc<RewriteConfig>,
    decoder: Arc<D>,
    index: Arc<I>,
    /// Limit documents resolved against the index at the same time
    document_semaphore: Arc<Semaphore>,
}

impl<D, I> Clone for LinkRewriter<D, I> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            decoder: Arc::clone(&self.decoder),
            index: Arc::clone(&self.index),
            document_semaphore: Arc::clone(&self.document_semaphore),
        }
    }
}

impl<I> LinkRewriter<MediaWiki, I>
where
    I: ArticleIndex + RedirectIndex,
{
    /// Create a rewriter decoding titles with the site's article path.
    pub fn new(config: RewriteConfig, index: Arc<I>) -> Self {
        let decoder = MediaWiki::from_config(&config);
        Self::with_decoder(config, decoder, index)
    }
}

impl<D, I> LinkRewriter<D, I>
where
    D: TitleDecoder,
    I: ArticleIndex + RedirectIndex,
{
    pub fn with_decoder(config: RewriteConfig, decoder: D, index: Arc<I>) -> Self {
        let permits = config.max_concurrent_documents();
        Self {
            config: Arc::new(config),
            decoder: Arc::new(decoder),
            index,
            document_semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Get reference to the underlying archive index.
    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// Rewrite a single link node of article `article_id`.
    pub async fn rewrite_url(
        &self,
        article_id: &str,
        node: &LinkNode,
    ) -> Result<RewriteResult, RewriteError> {
        self.rewrite_urls(article_id, std::slice::from_ref(node)).await
    }

    /// Rewrite link nodes of article `article_id`.
    ///
    /// Nodes are processed in order; a node listed twice is processed once.
    ///
    /// # Errors
    /// [`RewriteError::IndexLookup`] when the archive index fails. Links
    /// handled before the lookup stay rewritten; wikilinks keep their
    /// intermediate hrefs.
    pub async fn rewrite_urls(
        &self,
        article_id: &str,
        nodes: &[LinkNode],
    ) -> Result<RewriteResult, RewriteError> {
        let mut result = RewriteResult::default();

        let mut mapping = self.classify_links(article_id, nodes, &mut result);
        result.stats.wikilinks = mapping.all_nodes().count();

        let summary =
            resolve_wikilinks(&mut mapping, &*self.index, &*self.index, &*self.decoder).await?;
        result.stats.mirrored = summary.mirrored;
        result.stats.redirected = summary.redirected;
        result.stats.unwrapped += summary.unwrapped;

        let normalized = normalize_depth(article_id, &mapping);

        log::debug!(
            "Link rewrite complete for {}: {} wikilinks ({} titles mirrored, {} redirected, {} unwrapped), {} media, {} geo, {} normalized",
            article_id,
            result.stats.wikilinks,
            result.stats.mirrored,
            result.stats.redirected,
            summary.unwrapped,
            result.stats.media,
            result.stats.geo,
            normalized
        );

        Ok(result)
    }

    /// Rewrite every link of `document`, in place.
    pub async fn rewrite_urls_of_doc(
        &self,
        document: NodeRef,
        article_id: &str,
    ) -> Result<DocumentRewrite, RewriteError> {
        let nodes = collect_link_nodes(&document);
        let RewriteResult {
            media_dependencies,
            stats,
        } = self.rewrite_urls(article_id, &nodes).await?;

        Ok(DocumentRewrite {
            document,
            media_dependencies,
            stats,
        })
    }

    /// Parse `html`, rewrite its links and serialize it back.
    pub async fn rewrite_html(
        &self,
        article_id: &str,
        html: &str,
    ) -> Result<(String, RewriteResult), RewriteError> {
        let rewrite = self
            .rewrite_urls_of_doc(parse_document(html), article_id)
            .await?;
        let output = serialize_document(&rewrite.document)?;

        Ok((
            output,
            RewriteResult {
                media_dependencies: rewrite.media_dependencies,
                stats: rewrite.stats,
            },
        ))
    }

    /// Rewrite several independent documents concurrently.
    ///
    /// At most `max_concurrent_documents` documents wait on the index at
    /// once. Results are in input order; one document failing does not
    /// affect the others.
    pub async fn rewrite_documents(
        &self,
        documents: Vec<(String, NodeRef)>,
    ) -> Vec<Result<DocumentRewrite, RewriteError>> {
        let rewrite_futures: Vec<_> = documents
            .into_iter()
            .map(|(article_id, document)| {
                let semaphore = Arc::clone(&self.document_semaphore);
                async move {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|e| IndexError::Other(format!("Semaphore error: {e}")))?;
                    self.rewrite_urls_of_doc(document, &article_id).await
                }
            })
            .collect();

        let results = futures::future::join_all(rewrite_futures).await;

        for res in &results {
            if let Err(e) = res {
                log::warn!("Failed to rewrite document links: {e}");
            }
        }

        results
    }

    /// Synchronous pass: handle every node that needs no lookup and group
    /// the rest by title.
    fn classify_links(
        &self,
        article_id: &str,
        nodes: &[LinkNode],
        result: &mut RewriteResult,
    ) -> WikilinkMapping {
        let web_protocol = self.config.web_protocol();
        let mut visited = HashSet::with_capacity(nodes.len());
        let mut mapping = WikilinkMapping::new();

        for node in nodes {
            if !visited.insert(node.identity()) {
                log::trace!("Skipping link visited twice: {node:?}");
                continue;
            }
            if let Some(title) = self.rewrite_url_no_article_check(article_id, node, &web_protocol, result) {
                mapping.register(title, node.clone());
            }
        }

        mapping
    }

    /// Rewrite one node as far as possible without the index. Returns the
    /// title when the node is a wikilink awaiting resolution.
    fn rewrite_url_no_article_check(
        &self,
        article_id: &str,
        node: &LinkNode,
        web_protocol: &str,
        result: &mut RewriteResult,
    ) -> Option<String> {
        let link = match classify(node, web_protocol) {
            Classification::Link(link) => link,
            Classification::Deleted => {
                result.stats.deleted += 1;
                return None;
            }
            Classification::Skip(_) => return None,
        };

        let intent = match link.intent() {
            LinkIntent::Geo => {
                if let Some(coordinate) = extract_coordinates(&link.href) {
                    node.set_attribute("href", &coordinate.to_geo_uri());
                    result.stats.geo += 1;
                    return None;
                }
                // Unusable coordinates: the rel decides, media links stay as is
                match link.rel_intent() {
                    LinkIntent::MediaCandidate => LinkIntent::NoRewrite,
                    other => other,
                }
            }
            other => other,
        };

        match intent {
            LinkIntent::MediaCandidate => {
                match rewrite_media_link(
                    article_id,
                    node,
                    &link.href,
                    &self.config,
                    &mut result.media_dependencies,
                ) {
                    MediaOutcome::Archived => result.stats.media += 1,
                    MediaOutcome::Deleted => {
                        result.stats.media_failed += 1;
                        result.stats.deleted += 1;
                    }
                    MediaOutcome::Skipped => {}
                }
                None
            }
            LinkIntent::ExternalLink | LinkIntent::InterwikiLink => {
                if rewrite_external_link(node, &link, self.config.base_url())
                    == ExternalOutcome::Unwrapped
                {
                    result.stats.unwrapped += 1;
                }
                result.stats.external += 1;
                None
            }
            LinkIntent::WikiLinkCandidate => rewrite_wikilink(node, &link.href, &*self.decoder),
            LinkIntent::Geo | LinkIntent::NoRewrite | LinkIntent::Invalid => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use crate::error::IndexResult;

    /// Index where every title is mirrored.
    struct MirrorAll;

    impl ArticleIndex for MirrorAll {
        async fn mirrored(&self, titles: &[String]) -> IndexResult<HashSet<String>> {
            Ok(titles.iter().cloned().collect())
        }
    }

    impl RedirectIndex for MirrorAll {
        async fn redirect_targets(&self, _titles: &[String]) -> IndexResult<HashMap<String, String>> {
            Ok(HashMap::new())
        }
    }

    fn rewriter() -> LinkRewriter<MediaWiki, MirrorAll> {
        let config = RewriteConfig::builder()
            .base_url("https://en.wikipedia.org")
            .build()
            .expect("valid config");
        LinkRewriter::new(config, Arc::new(MirrorAll))
    }

    #[tokio::test]
    async fn test_duplicate_nodes_are_visited_once() {
        let doc = parse_document(r#"<a href="./Paris" rel="mw:WikiLink">Paris</a>"#);
        let node = collect_link_nodes(&doc).remove(0);

        let result = rewriter()
            .rewrite_urls("Cities/France", &[node.clone(), node.clone()])
            .await
            .expect("rewrite");

        assert_eq!(result.stats.wikilinks, 1);
        assert_eq!(node.attribute("href").as_deref(), Some("../../A/Paris"));
    }

    #[tokio::test]
    async fn test_geo_failure_falls_back_to_rel() {
        let doc = parse_document(
            r#"<a href="https://geohack.toolforge.org/geohack.php?params=abc" rel="mw:ExtLink">map</a>
               <a href="https://geohack.toolforge.org/geohack.php?params=abc" rel="mw:MediaLink">file</a>"#,
        );
        let nodes = collect_link_nodes(&doc);

        let result = rewriter().rewrite_urls("Paris", &nodes).await.expect("rewrite");

        assert_eq!(result.stats.geo, 0);
        assert_eq!(result.stats.external, 1);
        assert_eq!(nodes[0].attribute("class").as_deref(), Some("external"));
        assert_eq!(nodes[1].attribute("class"), None);
        assert!(result.media_dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_geo_link_becomes_geo_uri() {
        let doc = parse_document(
            r#"<a href="https://geohack.toolforge.org/geohack.php?params=48.8583;2.2944" rel="mw:ExtLink">map</a>"#,
        );
        let node = collect_link_nodes(&doc).remove(0);

        let result = rewriter().rewrite_url("Eiffel_Tower", &node).await.expect("rewrite");

        assert_eq!(result.stats.geo, 1);
        assert_eq!(node.attribute("href").as_deref(), Some("geo:48.8583,2.2944"));
        assert_eq!(node.attribute("class"), None);
    }

    #[tokio::test]
    async fn test_rewrite_html_roundtrip() {
        let (html, result) = rewriter()
            .rewrite_html("Paris", r#"<p><a href="./Lyon#Food" rel="mw:WikiLink">Lyon</a></p>"#)
            .await
            .expect("rewrite");

        assert!(html.contains(r##"<a href="Lyon#Food" rel="mw:WikiLink">Lyon</a>"##));
        assert_eq!(result.stats.mirrored, 1);
    }
}
