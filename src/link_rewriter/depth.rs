//! Path depth normalization for articles in sub-directories.

use crate::utils::CONTENT_NAMESPACE;

use super::wikilink::WikilinkMapping;

/// Prefix leading from `article_id`'s directory back into the article
/// namespace, or `None` for top-level articles.
#[must_use]
pub fn depth_prefix(article_id: &str) -> Option<String> {
    let slashes = article_id.matches('/').count();
    (slashes > 0).then(|| format!("{}{CONTENT_NAMESPACE}/", "../".repeat(slashes + 1)))
}

/// Prefix the href of every wikilink still in `mapping` so it resolves from
/// the article's directory. Returns the number of nodes touched.
pub fn normalize_depth(article_id: &str, mapping: &WikilinkMapping) -> usize {
    let Some(prefix) = depth_prefix(article_id) else {
        return 0;
    };

    let mut normalized = 0;
    for node in mapping.all_nodes() {
        let href = node.attribute("href").unwrap_or_default();
        node.set_attribute("href", &format!("{prefix}{href}"));
        normalized += 1;
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{collect_link_nodes, parse_document};

    #[test]
    fn test_depth_prefix() {
        assert_eq!(depth_prefix("Paris"), None);
        assert_eq!(depth_prefix("AC/DC").as_deref(), Some("../../A/"));
        assert_eq!(depth_prefix("a/b/c").as_deref(), Some("../../../A/"));
    }

    #[test]
    fn test_normalize_depth() {
        let doc = parse_document(r##"<a href="Paris">1</a><a href="Lyon#Food">2</a>"##);
        let nodes = collect_link_nodes(&doc);
        let mut mapping = WikilinkMapping::new();
        mapping.register("Paris".to_string(), nodes[0].clone());
        mapping.register("Lyon".to_string(), nodes[1].clone());

        assert_eq!(normalize_depth("Paris", &mapping), 0);
        assert_eq!(nodes[0].attribute("href").as_deref(), Some("Paris"));

        assert_eq!(normalize_depth("Cities/France", &mapping), 2);
        assert_eq!(nodes[0].attribute("href").as_deref(), Some("../../A/Paris"));
        assert_eq!(nodes[1].attribute("href").as_deref(), Some("../../A/Lyon#Food"));
    }
}
