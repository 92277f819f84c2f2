//! Resolve grouped wikilinks against the archive index.
//!
//! Two batched lookups, strictly one after the other:
//! 1. which titles are mirrored (their links are already correct),
//! 2. which of the others are redirects (links retargeted to the redirect
//!    target). Links to anything else are unwrapped.

use crate::error::IndexResult;
use crate::link_index::{ArticleIndex, RedirectIndex};
use crate::mediawiki::TitleDecoder;

use super::wikilink::WikilinkMapping;

/// Counts produced by one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Titles found in the archive
    pub mirrored: usize,
    /// Nodes pointed at a redirect target
    pub redirected: usize,
    /// Nodes replaced by their content
    pub unwrapped: usize,
}

/// Resolve every title of `mapping`.
///
/// Titles that are neither mirrored nor redirects are removed from the
/// mapping after their nodes are unwrapped. On lookup failure the mapping
/// and the document are left as they were when the failing lookup started.
pub async fn resolve_wikilinks<A, R, D>(
    mapping: &mut WikilinkMapping,
    articles: &A,
    redirects: &R,
    decoder: &D,
) -> IndexResult<ResolutionSummary>
where
    A: ArticleIndex,
    R: RedirectIndex,
    D: TitleDecoder,
{
    let mut summary = ResolutionSummary::default();
    if mapping.is_empty() {
        return Ok(summary);
    }

    let titles = mapping.titles();
    let existing = articles.mirrored(&titles).await?;

    let (mirrored, unmirrored): (Vec<String>, Vec<String>) =
        titles.into_iter().partition(|title| existing.contains(title));
    summary.mirrored = mirrored.len();

    if unmirrored.is_empty() {
        return Ok(summary);
    }

    let targets = redirects.redirect_targets(&unmirrored).await?;

    for title in unmirrored {
        match targets.get(&title).filter(|target| !target.is_empty()) {
            Some(target) => {
                let href = decoder.encode_article_id_for_zim_html_url(target);
                for node in mapping.nodes(&title) {
                    node.set_attribute("href", &href);
                    summary.redirected += 1;
                }
                log::trace!("Redirected links to {title} -> {target}");
            }
            None => {
                for node in mapping.remove(&title).unwrap_or_default() {
                    node.unwrap();
                    summary.unwrapped += 1;
                }
                log::trace!("Unwrapped links to unmirrored article {title}");
            }
        }
    }

    Ok(summary)
}
