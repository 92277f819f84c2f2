//! First pass over a link: protocol sniffing and `rel` inference.
//!
//! Classification may already rewrite the node (protocol-relative hrefs) or
//! delete it (empty hrefs). Everything else is decided later from the
//! returned [`ClassifiedLink`].

use crate::dom::LinkNode;
use crate::utils::{
    REL_EXT_LINK, REL_INTERWIKI_LINK, REL_MEDIA_LINK, REL_NOFOLLOW, REL_NO_REWRITE,
    REL_REFERENCED_BY, REL_WIKI_LINK, href_protocol, is_http_protocol,
};

use super::geo;

/// What the rewriter intends to do with a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkIntent {
    /// Leave the link exactly as it is
    NoRewrite,
    /// Map link to be replaced by a `geo:` URI
    Geo,
    /// Link to a media file that may be archived
    MediaCandidate,
    /// External link (`mw:ExtLink*`, `nofollow`)
    ExternalLink,
    /// Link to another wiki
    InterwikiLink,
    /// Link that may point at an article of this wiki
    WikiLinkCandidate,
    /// Malformed or empty href
    Invalid,
}

/// A link that survived classification, with its effective `rel` and href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    /// `rel` attribute, or the rel inferred from the link's shape
    pub rel: Option<String>,
    /// href after protocol-relative resolution
    pub href: String,
    /// Lower-cased protocol with trailing colon, if any
    pub protocol: Option<String>,
}

/// Outcome of classifying one link node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing more to do with this node
    Skip(LinkIntent),
    /// The node had no href and was removed from the document
    Deleted,
    /// The node continues through the rewriting stages
    Link(ClassifiedLink),
}

impl ClassifiedLink {
    #[must_use]
    pub fn rel(&self) -> Option<&str> {
        self.rel.as_deref()
    }

    /// Intent of the link. Map links are recognised by href, all other
    /// intents by `rel`.
    #[must_use]
    pub fn intent(&self) -> LinkIntent {
        if self.rel() != Some(REL_WIKI_LINK) && geo::detect_dialect(&self.href).is_some() {
            return LinkIntent::Geo;
        }
        self.rel_intent()
    }

    /// Intent derived from `rel` alone.
    #[must_use]
    pub fn rel_intent(&self) -> LinkIntent {
        match self.rel() {
            None | Some(REL_WIKI_LINK) | Some(REL_REFERENCED_BY) => LinkIntent::WikiLinkCandidate,
            Some(REL_MEDIA_LINK) => LinkIntent::MediaCandidate,
            Some(REL_INTERWIKI_LINK) => LinkIntent::InterwikiLink,
            Some(rel) if rel.starts_with(REL_EXT_LINK) || rel == REL_NOFOLLOW => {
                LinkIntent::ExternalLink
            }
            Some(_) => LinkIntent::NoRewrite,
        }
    }
}

/// Classify a link node.
///
/// `web_protocol` (`"https:"`) is prepended to protocol-relative hrefs, and
/// the node's href is updated in place when that happens.
pub fn classify(node: &LinkNode, web_protocol: &str) -> Classification {
    let mut rel = node.attribute("rel").filter(|r| !r.is_empty());
    let mut href = node.attribute("href").unwrap_or_default();

    let mut protocol = match href_protocol(&href) {
        Ok(protocol) => protocol,
        Err(e) => {
            log::debug!("Leaving link untouched: {e}");
            return Classification::Skip(LinkIntent::Invalid);
        }
    };

    // geo:, mailto:, tel:, ...
    if protocol.as_deref().is_some_and(|p| !is_http_protocol(p)) {
        return Classification::Skip(LinkIntent::NoRewrite);
    }

    if rel.as_deref() == Some(REL_NO_REWRITE) {
        return Classification::Skip(LinkIntent::NoRewrite);
    }

    if protocol.is_none() && href.starts_with("//") {
        href = format!("{web_protocol}{href}");
        node.set_attribute("href", &href);
        protocol = Some(web_protocol.to_string());
    }

    if rel.is_none() && node.attribute("resource").is_some_and(|r| !r.is_empty()) {
        rel = Some(REL_MEDIA_LINK.to_string());
    }

    if rel.is_none() && protocol.as_deref().is_some_and(is_http_protocol) {
        rel = Some(REL_EXT_LINK.to_string());
    }

    if href.is_empty() {
        node.delete();
        return Classification::Deleted;
    }

    if href.starts_with('#') {
        return Classification::Skip(LinkIntent::NoRewrite);
    }

    Classification::Link(ClassifiedLink {
        rel,
        href,
        protocol,
    })
}
