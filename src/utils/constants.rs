//! Shared constants for link rewriting
//!
//! Archive namespace markers, the Parsoid `rel` vocabulary the rewriter
//! understands, and configuration defaults.

/// Namespace marker for articles inside the archive.
pub const CONTENT_NAMESPACE: &str = "A";

/// Namespace marker for media files (images, audio, PDFs) inside the archive.
pub const MEDIA_NAMESPACE: &str = "I";

/// Parsoid rel for links that must be left exactly as scraped.
pub const REL_NO_REWRITE: &str = "mwo:NoRewrite";

/// Parsoid rel for links to media files.
pub const REL_MEDIA_LINK: &str = "mw:MediaLink";

/// Parsoid rel prefix for external links (`mw:ExtLink`, `mw:ExtLink/ISBN`, ...).
pub const REL_EXT_LINK: &str = "mw:ExtLink";

/// Parsoid rel for links to other pages of the same wiki.
pub const REL_WIKI_LINK: &str = "mw:WikiLink";

/// Parsoid rel for interwiki links.
pub const REL_INTERWIKI_LINK: &str = "mw:WikiLink/Interwiki";

/// Parsoid rel for citation back-references.
pub const REL_REFERENCED_BY: &str = "mw:referencedBy";

/// Plain-HTML rel emitted by the action API for external links.
pub const REL_NOFOLLOW: &str = "nofollow";

/// Class appended to external and interwiki links.
pub const EXTERNAL_CLASS: &str = "external";

/// Default article path appended to the base URL when no web URL is set.
pub const DEFAULT_ARTICLE_PATH: &str = "wiki/";

/// Default bound on documents resolved against the index at the same time.
pub const DEFAULT_MAX_CONCURRENT_DOCUMENTS: usize = 32;

/// Longest media file name kept verbatim; longer names are hashed.
pub const MAX_MEDIA_FILENAME_LEN: usize = 249;

/// Marks left unescaped in URI components.
pub const URI_COMPONENT_MARKS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// Extension given to media file names that have none.
pub const DEFAULT_MEDIA_EXTENSION: &str = ".svg";

/// Rows per `IN (...)` query against the SQLite index.
///
/// SQLite caps bound variables at 999 on older builds.
pub const INDEX_QUERY_CHUNK: usize = 500;
