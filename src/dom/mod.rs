//! DOM adapter over kuchiki for link rewriting.
//!
//! The rewriter only needs a handful of tree operations on link elements:
//! attribute access, unwrapping a link into its children and deleting a link
//! with its subtree. They live here so the rewriting logic never touches
//! kuchiki directly.

use std::fmt;
use std::rc::Rc;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

/// Tags whose `href` the rewriter processes, in processing order.
const LINK_TAGS: [&str; 2] = ["a", "area"];

/// Handle to a link element (`<a>` or `<area>`) inside a parsed document.
///
/// Cloning is cheap and yields a handle to the same element.
#[derive(Clone, PartialEq)]
pub struct LinkNode {
    node: NodeRef,
}

impl LinkNode {
    /// Wrap an element node. Returns `None` for text, comment and document
    /// nodes.
    #[must_use]
    pub fn from_node(node: NodeRef) -> Option<Self> {
        node.as_element()?;
        Some(Self { node })
    }

    /// Underlying kuchiki node
    #[must_use]
    pub fn as_node(&self) -> &NodeRef {
        &self.node
    }

    /// Identity of the element, stable for the lifetime of the tree.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.node.0) as usize
    }

    /// Local tag name (`"a"`, `"area"`)
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.node
            .as_element()
            .map(|el| el.name.local.to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        let el = self.node.as_element()?;
        el.attributes.borrow().get(name).map(str::to_string)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        if let Some(el) = self.node.as_element() {
            el.attributes.borrow_mut().insert(name, value.to_string());
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(el) = self.node.as_element() {
            el.attributes.borrow_mut().remove(name);
        }
    }

    /// Add a class to the `class` attribute unless it is already there.
    pub fn append_class(&self, class: &str) {
        let current = self.attribute("class").unwrap_or_default();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let updated = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", current.trim_end())
        };
        self.set_attribute("class", &updated);
    }

    /// Replace the element with its children, then detach it.
    ///
    /// An element without a parent is only detached; its children stay with
    /// it.
    pub fn unwrap(&self) {
        if self.node.parent().is_some() {
            // Collect first: insert_before detaches each child from self.
            let children: Vec<NodeRef> = self.node.children().collect();
            for child in children {
                self.node.insert_before(child);
            }
        }
        self.node.detach();
    }

    /// Remove the element and its whole subtree from the document.
    pub fn delete(&self) {
        self.node.detach();
    }

    /// Whether the element is still part of a tree
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.node.parent().is_some()
    }
}

impl fmt::Debug for LinkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkNode")
            .field("tag", &self.tag_name())
            .field("href", &self.attribute("href"))
            .field("rel", &self.attribute("rel"))
            .finish()
    }
}

/// Parse an HTML document.
#[must_use]
pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// Serialize a document (or any subtree) back to HTML.
pub fn serialize_document(document: &NodeRef) -> std::io::Result<String> {
    let mut output = Vec::new();
    document.serialize(&mut output)?;
    String::from_utf8(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// All `<a>` elements of the document followed by all `<area>` elements,
/// each group in document order.
#[must_use]
pub fn collect_link_nodes(document: &NodeRef) -> Vec<LinkNode> {
    LINK_TAGS
        .iter()
        .flat_map(|tag| {
            document
                .inclusive_descendants()
                .filter(move |node| {
                    node.as_element()
                        .is_some_and(|el| &*el.name.local == *tag)
                })
                .filter_map(LinkNode::from_node)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_link(document: &NodeRef) -> LinkNode {
        collect_link_nodes(document).remove(0)
    }

    #[test]
    fn test_attribute_roundtrip() {
        let doc = parse_document(r#"<p><a href="./Paris" rel="mw:WikiLink">Paris</a></p>"#);
        let link = first_link(&doc);

        assert_eq!(link.tag_name(), "a");
        assert_eq!(link.attribute("href").as_deref(), Some("./Paris"));
        link.set_attribute("href", "Paris");
        assert_eq!(link.attribute("href").as_deref(), Some("Paris"));
        link.remove_attribute("rel");
        assert_eq!(link.attribute("rel"), None);
    }

    #[test]
    fn test_append_class() {
        let doc = parse_document(r#"<a href="x" class="text">x</a><a href="y">y</a>"#);
        let links = collect_link_nodes(&doc);

        links[0].append_class("external");
        links[0].append_class("external");
        assert_eq!(links[0].attribute("class").as_deref(), Some("text external"));

        links[1].append_class("external");
        assert_eq!(links[1].attribute("class").as_deref(), Some("external"));
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let doc = parse_document(
            r#"<p>Before <a href="./Nowhere"><b>bold</b> text</a> after</p>"#,
        );
        let link = first_link(&doc);
        link.unwrap();

        assert!(!link.is_attached());
        let html = serialize_document(&doc).unwrap();
        assert!(html.contains("<p>Before <b>bold</b> text after</p>"));
        assert!(collect_link_nodes(&doc).is_empty());
    }

    #[test]
    fn test_delete_removes_subtree() {
        let doc = parse_document(r#"<p>Keep <a href=""><i>gone</i></a>this</p>"#);
        first_link(&doc).delete();

        let html = serialize_document(&doc).unwrap();
        assert!(html.contains("<p>Keep this</p>"));
        assert!(!html.contains("gone"));
    }

    #[test]
    fn test_collect_orders_anchors_before_areas() {
        let doc = parse_document(
            r##"<map name="m"><area href="#a1"></map><a href="#x">x</a><a href="#y">y</a>"##,
        );
        let hrefs: Vec<_> = collect_link_nodes(&doc)
            .iter()
            .map(|n| n.attribute("href").unwrap_or_default())
            .collect();
        assert_eq!(hrefs, vec!["#x", "#y", "#a1"]);
    }

    #[test]
    fn test_identity_is_per_element() {
        let doc = parse_document(r#"<a href="1">1</a><a href="2">2</a>"#);
        let links = collect_link_nodes(&doc);
        let again = collect_link_nodes(&doc);

        assert_eq!(links[0].identity(), again[0].identity());
        assert_ne!(links[0].identity(), links[1].identity());
        assert_eq!(links[0], again[0]);
    }
}
