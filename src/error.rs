//! Error types for link rewriting
//!
//! Only [`RewriteError::IndexLookup`] and [`RewriteError::Serialize`] ever
//! escape a document rewrite. Malformed URLs and unresolvable media are
//! handled per node and reported through logs and statistics.

use thiserror::Error;

/// Result type alias for archive index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while rewriting the links of one document
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The href carries a scheme but is not a valid URL
    #[error("Malformed URL '{href}': {reason}")]
    MalformedUrl { href: String, reason: String },

    /// No in-archive path could be computed for a media link
    #[error("Cannot resolve media path for '{href}': {reason}")]
    UnresolvableMedia { href: String, reason: String },

    /// The existence or redirect index failed; the document is left
    /// partially resolved
    #[error("Archive index lookup failed: {0}")]
    IndexLookup(#[from] IndexError),

    /// Serializing the rewritten document failed
    #[error("Failed to serialize rewritten document: {0}")]
    Serialize(#[from] std::io::Error),
}

/// Errors raised by an archive index implementation
#[derive(Debug, Error)]
pub enum IndexError {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error while opening the index
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for IndexError {
    fn from(error: anyhow::Error) -> Self {
        IndexError::Other(error.to_string())
    }
}

impl RewriteError {
    /// Whether the error aborts the whole document rather than one link
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, RewriteError::IndexLookup(_) | RewriteError::Serialize(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let malformed = RewriteError::MalformedUrl {
            href: "http://[".to_string(),
            reason: "invalid IPv6 address".to_string(),
        };
        assert!(!malformed.is_fatal());

        let lookup = RewriteError::from(IndexError::Other("connection reset".to_string()));
        assert!(lookup.is_fatal());
        assert_eq!(
            lookup.to_string(),
            "Archive index lookup failed: connection reset"
        );
    }
}
