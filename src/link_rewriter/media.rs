//! Media links: point them at the archived copy of the file.

use crate::config::RewriteConfig;
use crate::dom::LinkNode;
use crate::utils::{MEDIA_NAMESPACE, get_media_base, get_relative_file_path};

/// What happened to a media link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOutcome {
    /// href now points inside the archive; the file is a dependency
    Archived,
    /// File type is not scraped with this configuration; link untouched
    Skipped,
    /// No archive path could be computed; link removed
    Deleted,
}

/// Whether the file behind `href` is scraped into the archive.
#[must_use]
pub fn is_scrapeable(href: &str, config: &RewriteConfig) -> bool {
    (href.contains(".pdf") && !config.exclude_pdf())
        || (href.contains(".ogg")
            && !config.exclude_images()
            && !config.exclude_videos()
            && !config.exclude_details())
}

/// Rewrite a `mw:MediaLink` node, appending its original href to
/// `dependencies` when the file will be archived.
pub fn rewrite_media_link(
    article_id: &str,
    node: &LinkNode,
    href: &str,
    config: &RewriteConfig,
    dependencies: &mut Vec<String>,
) -> MediaOutcome {
    if !is_scrapeable(href, config) {
        return MediaOutcome::Skipped;
    }

    match get_media_base(href) {
        Ok(base) => {
            let path = get_relative_file_path(article_id, &base, MEDIA_NAMESPACE);
            log::trace!("Media link {href} -> {path}");
            node.set_attribute("href", &path);
            dependencies.push(href.to_string());
            MediaOutcome::Archived
        }
        Err(e) => {
            log::warn!("Error parsing url for media link in {article_id}: {e}");
            node.delete();
            MediaOutcome::Deleted
        }
    }
}
