pub mod config;
pub mod dom;
pub mod error;
pub mod link_index;
pub mod link_rewriter;
pub mod mediawiki;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

pub use config::RewriteConfig;
pub use dom::{LinkNode, collect_link_nodes, parse_document, serialize_document};
pub use error::{IndexError, IndexResult, RewriteError};
pub use link_index::{ArticleIndex, RedirectIndex, SqliteArchiveIndex};
pub use link_rewriter::{
    DocumentRewrite, GeoCoordinate, LinkIntent, LinkRewriter, RewriteResult, RewriteStats,
    WikilinkMapping,
};
pub use mediawiki::{MediaWiki, TitleDecoder};

/// Rewrite the links of one article against the index stored under
/// `index_dir`.
pub async fn rewrite_article(
    config: RewriteConfig,
    index_dir: &Path,
    article_id: &str,
    html: &str,
) -> anyhow::Result<(String, RewriteResult)> {
    let index = Arc::new(
        SqliteArchiveIndex::open(index_dir)
            .await
            .context("Failed to open archive index")?,
    );
    let rewriter = LinkRewriter::new(config, Arc::clone(&index));

    let rewritten = rewriter
        .rewrite_html(article_id, html)
        .await
        .with_context(|| format!("Failed to rewrite links of {article_id}"));

    index.close().await;
    rewritten
}
