//! Wikilink title extraction and grouping.

use indexmap::IndexMap;

use crate::dom::LinkNode;
use crate::mediawiki::TitleDecoder;

/// Wikilink nodes of one document grouped by target title, in first-seen
/// order.
#[derive(Debug, Default, Clone)]
pub struct WikilinkMapping {
    entries: IndexMap<String, Vec<LinkNode>>,
}

impl WikilinkMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `node` to the nodes linking to `title`.
    pub fn register(&mut self, title: String, node: LinkNode) {
        self.entries.entry(title).or_default().push(node);
    }

    /// Titles in first-seen order
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Nodes linking to `title`
    #[must_use]
    pub fn nodes(&self, title: &str) -> &[LinkNode] {
        self.entries.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop `title`, keeping the order of the remaining titles.
    pub fn remove(&mut self, title: &str) -> Option<Vec<LinkNode>> {
        self.entries.shift_remove(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<LinkNode>)> {
        self.entries.iter()
    }

    /// Every node still in the mapping
    pub fn all_nodes(&self) -> impl Iterator<Item = &LinkNode> {
        self.entries.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Point a wikilink at its archive id and return its title.
///
/// The fragment (from the last `#`) is kept verbatim. Returns `None`, with
/// the node untouched, when the href names no article of this wiki.
pub fn rewrite_wikilink<D: TitleDecoder>(
    node: &LinkNode,
    href: &str,
    decoder: &D,
) -> Option<String> {
    let title = decoder.extract_page_title_from_href(href)?;
    let fragment = href.rfind('#').map_or("", |idx| &href[idx..]);

    let encoded = decoder.encode_article_id_for_zim_html_url(&title);
    node.set_attribute("href", &format!("{encoded}{fragment}"));
    Some(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{collect_link_nodes, parse_document};
    use crate::mediawiki::MediaWiki;

    #[test]
    fn test_rewrite_keeps_last_fragment() {
        let doc = parse_document(r#"<a href="./Eiffel_Tower#History#Tops">x</a>"#);
        let node = collect_link_nodes(&doc).remove(0);
        let wiki = MediaWiki::new("/wiki/");

        let title = rewrite_wikilink(&node, "./Eiffel_Tower#History#Tops", &wiki);

        assert_eq!(title.as_deref(), Some("Eiffel_Tower"));
        assert_eq!(node.attribute("href").as_deref(), Some("Eiffel_Tower#Tops"));
    }

    #[test]
    fn test_rewrite_encodes_title() {
        let doc = parse_document(r#"<a href="/wiki/AC/DC">x</a>"#);
        let node = collect_link_nodes(&doc).remove(0);
        let wiki = MediaWiki::new("/wiki/");

        assert_eq!(rewrite_wikilink(&node, "/wiki/AC/DC", &wiki).as_deref(), Some("AC/DC"));
        assert_eq!(node.attribute("href").as_deref(), Some("AC%2FDC"));
    }

    #[test]
    fn test_non_article_href_is_untouched() {
        let doc = parse_document(r#"<a href="/w/index.php?title=X">x</a>"#);
        let node = collect_link_nodes(&doc).remove(0);
        let wiki = MediaWiki::new("/wiki/");

        assert_eq!(rewrite_wikilink(&node, "/w/index.php?title=X", &wiki), None);
        assert_eq!(node.attribute("href").as_deref(), Some("/w/index.php?title=X"));
    }

    #[test]
    fn test_mapping_groups_in_first_seen_order() {
        let doc = parse_document(r#"<a href="1">1</a><a href="2">2</a><a href="3">3</a>"#);
        let nodes = collect_link_nodes(&doc);
        let mut mapping = WikilinkMapping::new();

        mapping.register("Paris".to_string(), nodes[0].clone());
        mapping.register("Lyon".to_string(), nodes[1].clone());
        mapping.register("Paris".to_string(), nodes[2].clone());

        assert_eq!(mapping.titles(), vec!["Paris".to_string(), "Lyon".to_string()]);
        assert_eq!(mapping.nodes("Paris").len(), 2);
        assert_eq!(mapping.all_nodes().count(), 3);

        mapping.register("Nice".to_string(), nodes[1].clone());
        assert_eq!(mapping.remove("Lyon").map(|n| n.len()), Some(1));
        assert_eq!(mapping.titles(), vec!["Paris".to_string(), "Nice".to_string()]);
        assert!(mapping.nodes("Lyon").is_empty());
    }
}
