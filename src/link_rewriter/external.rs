//! External and interwiki links.

use url::Url;

use crate::dom::LinkNode;
use crate::utils::{EXTERNAL_CLASS, REL_EXT_LINK, REL_INTERWIKI_LINK, REL_NOFOLLOW, get_full_url};

use super::classifier::ClassifiedLink;

/// What happened to an external or interwiki link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// Root-relative href resolved against the site base URL
    Absolutized,
    /// Parsoid-relative href: link replaced by its content
    Unwrapped,
    /// href left as is (the class may still have been added)
    Unchanged,
}

/// Mark external links and make their hrefs usable outside the wiki.
pub fn rewrite_external_link(
    node: &LinkNode,
    link: &ClassifiedLink,
    base_url: &Url,
) -> ExternalOutcome {
    let rel = link.rel().unwrap_or_default();
    let is_ext_link = rel.starts_with(REL_EXT_LINK);

    if is_ext_link || rel == REL_INTERWIKI_LINK {
        node.append_class(EXTERNAL_CLASS);
    }

    if !is_ext_link && rel != REL_NOFOLLOW {
        return ExternalOutcome::Unchanged;
    }

    if link.href.starts_with('/') {
        match get_full_url(&link.href, base_url) {
            Ok(absolute) => {
                node.set_attribute("href", &absolute);
                ExternalOutcome::Absolutized
            }
            Err(e) => {
                log::debug!("Cannot absolutize {}: {e}", link.href);
                ExternalOutcome::Unchanged
            }
        }
    } else if link.href.starts_with("./") {
        node.unwrap();
        ExternalOutcome::Unwrapped
    } else {
        ExternalOutcome::Unchanged
    }
}
