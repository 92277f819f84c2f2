//! Property tests for link rewriting invariants

use std::sync::Arc;

use proptest::prelude::*;
use zim_link_rewriter::link_rewriter::{Classification, classify, depth_prefix};
use zim_link_rewriter::{LinkRewriter, collect_link_nodes, parse_document};

mod common;
use common::{MemoryIndex, wikipedia_config};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("test runtime")
}

proptest! {
    #[test]
    fn protocol_relative_rewrite_is_idempotent(host in "[a-z]{1,12}\\.org", path in "[A-Za-z0-9_]{0,20}") {
        let href = format!("//{host}/{path}");
        let doc = parse_document(&format!(r#"<a href="{href}" rel="mw:ExtLink">x</a>"#));
        let node = collect_link_nodes(&doc).remove(0);

        let first = classify(&node, "https:");
        let after_first = node.attribute("href");
        let second = classify(&node, "https:");

        let expected = format!("https:{href}");
        prop_assert_eq!(after_first.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(node.attribute("href"), after_first);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn depth_prefix_matches_slash_count(segments in proptest::collection::vec("[A-Za-z]{1,8}", 1..6)) {
        let article_id = segments.join("/");
        let slashes = segments.len() - 1;

        match depth_prefix(&article_id) {
            None => prop_assert_eq!(slashes, 0),
            Some(prefix) => {
                prop_assert_eq!(prefix.matches("../").count(), slashes + 1);
                prop_assert!(prefix.ends_with("A/"));
            }
        }
    }

    #[test]
    fn mirrored_links_are_prefixed_exactly_once(segments in proptest::collection::vec("[A-Za-z]{1,8}", 2..5)) {
        let article_id = segments.join("/");
        let rewriter = LinkRewriter::new(
            wikipedia_config(),
            Arc::new(MemoryIndex::new().with_articles(&["Paris"])),
        );
        let doc = parse_document(r#"<a href="./Paris">1</a><a href="./Paris#Name">2</a>"#);
        let nodes = collect_link_nodes(&doc);

        runtime()
            .block_on(rewriter.rewrite_urls(&article_id, &nodes))
            .expect("rewrite");

        let prefix = depth_prefix(&article_id).expect("nested article");
        prop_assert_eq!(nodes[0].attribute("href"), Some(format!("{prefix}Paris")));
        prop_assert_eq!(nodes[1].attribute("href"), Some(format!("{prefix}Paris#Name")));
    }
}

#[test]
fn classification_of_deleted_link_is_terminal() {
    let doc = parse_document(r#"<a href="">x</a>"#);
    let node = collect_link_nodes(&doc).remove(0);
    assert_eq!(classify(&node, "https:"), Classification::Deleted);
}
