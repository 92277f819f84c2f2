//! Archive index used to resolve wikilinks.
//!
//! The rewriter asks two batched questions about the titles a document links
//! to:
//! - "Which of these titles are mirrored in the archive?" ([`ArticleIndex`])
//! - "Which of the remaining titles are redirects, and to what?" ([`RedirectIndex`])
//!
//! [`SqliteArchiveIndex`] answers both from a SQLite database so several
//! article workers can share one index.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;

use crate::error::IndexResult;
use crate::utils::INDEX_QUERY_CHUNK;

/// Batched existence lookup for article titles.
pub trait ArticleIndex {
    /// Subset of `titles` that exist in the archive.
    ///
    /// Titles missing from the result are treated as not mirrored.
    fn mirrored(&self, titles: &[String]) -> impl Future<Output = IndexResult<HashSet<String>>> + Send;
}

/// Batched redirect lookup for article titles.
pub trait RedirectIndex {
    /// Redirect target of every title in `titles` that is a redirect.
    ///
    /// Titles missing from the result have no redirect.
    fn redirect_targets(
        &self,
        titles: &[String],
    ) -> impl Future<Output = IndexResult<HashMap<String, String>>> + Send;
}

/// SQL schema for the archive index database
const SCHEMA_SQL: &str = r#"
-- Articles that will be written to the archive
CREATE TABLE IF NOT EXISTS articles (
    title TEXT PRIMARY KEY,
    registered_at INTEGER NOT NULL
);

-- Redirects: alias title -> canonical target title
CREATE TABLE IF NOT EXISTS redirects (
    title TEXT PRIMARY KEY,
    target TEXT NOT NULL,
    registered_at INTEGER NOT NULL
);

-- Index for reverse lookups (which aliases point at an article)
CREATE INDEX IF NOT EXISTS idx_redirects_target ON redirects(target);
"#;

const REDIRECT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1_000) {
    Some(capacity) => capacity,
    None => panic!("redirect cache capacity must be non-zero"),
};

/// Persistent index of archived articles and redirects.
///
/// Uses SQLite with WAL mode so lookups from concurrent article workers do
/// not block on writers.
#[derive(Clone)]
pub struct SqliteArchiveIndex {
    pool: SqlitePool,
    index_dir: PathBuf,
    /// Recently resolved redirect lookups (`None` = not a redirect)
    redirect_cache: Arc<RwLock<lru::LruCache<String, Option<String>>>>,
}

impl SqliteArchiveIndex {
    /// Open existing index or create new one.
    ///
    /// The database is stored at `{dir}/.zim_link_rewriter/archive_index.sqlite`
    pub async fn open(dir: &Path) -> IndexResult<Self> {
        let db_dir = dir.join(".zim_link_rewriter");
        tokio::fs::create_dir_all(&db_dir).await?;

        let db_path = db_dir.join("archive_index.sqlite");

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        // Idempotent (CREATE IF NOT EXISTS)
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        log::debug!("Opened archive index at {}", db_path.display());

        Ok(Self {
            pool,
            index_dir: dir.to_path_buf(),
            redirect_cache: Arc::new(RwLock::new(lru::LruCache::new(REDIRECT_CACHE_CAPACITY))),
        })
    }

    /// Record that `title` is (or will be) an article of the archive.
    pub async fn register_article(&self, title: &str) -> IndexResult<()> {
        self.register_articles(&[title.to_string()]).await
    }

    /// Record a batch of articles in one transaction.
    pub async fn register_articles(&self, titles: &[String]) -> IndexResult<()> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for title in titles {
            sqlx::query(
                r#"
                INSERT INTO articles (title, registered_at)
                VALUES (?, ?)
                ON CONFLICT(title) DO UPDATE SET registered_at = excluded.registered_at
                "#,
            )
            .bind(title)
            .bind(timestamp)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Record that `title` redirects to `target`.
    pub async fn register_redirect(&self, title: &str, target: &str) -> IndexResult<()> {
        let timestamp = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO redirects (title, target, registered_at)
            VALUES (?, ?, ?)
            ON CONFLICT(title) DO UPDATE SET
                target = excluded.target,
                registered_at = excluded.registered_at
            "#,
        )
        .bind(title)
        .bind(target)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;

        {
            let mut cache = self.redirect_cache.write().await;
            cache.put(title.to_string(), Some(target.to_string()));
        }

        Ok(())
    }

    /// Aliases that redirect to `target`.
    pub async fn redirects_to(&self, target: &str) -> IndexResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT title FROM redirects WHERE target = ? ORDER BY title")
                .bind(target)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(title,)| title).collect())
    }

    /// Get total number of indexed articles.
    pub async fn article_count(&self) -> IndexResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Get total number of indexed redirects.
    pub async fn redirect_count(&self) -> IndexResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM redirects")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Get the directory this index is stored under.
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run `SELECT {columns} FROM {table} WHERE title IN (...)` over
    /// `titles` in chunks, handing every row to `on_row`.
    async fn select_in_chunks(
        &self,
        table: &str,
        columns: &str,
        titles: &[String],
        mut on_row: impl FnMut(&sqlx::sqlite::SqliteRow) + Send,
    ) -> IndexResult<()> {
        for chunk in titles.chunks(INDEX_QUERY_CHUNK) {
            let placeholders: Vec<&str> = chunk.iter().map(|_| "?").collect();
            let query_str = format!(
                "SELECT {columns} FROM {table} WHERE title IN ({})",
                placeholders.join(", ")
            );

            let mut query = sqlx::query(&query_str);
            for title in chunk {
                query = query.bind(title);
            }

            for row in query.fetch_all(&self.pool).await? {
                on_row(&row);
            }
        }
        Ok(())
    }
}

impl ArticleIndex for SqliteArchiveIndex {
    async fn mirrored(&self, titles: &[String]) -> IndexResult<HashSet<String>> {
        let mut existing = HashSet::new();
        if titles.is_empty() {
            return Ok(existing);
        }

        self.select_in_chunks("articles", "title", titles, |row| {
            existing.insert(row.get::<String, _>("title"));
        })
        .await?;

        Ok(existing)
    }
}

impl RedirectIndex for SqliteArchiveIndex {
    async fn redirect_targets(&self, titles: &[String]) -> IndexResult<HashMap<String, String>> {
        let mut targets = HashMap::new();
        let mut uncached = Vec::new();

        {
            let cache = self.redirect_cache.read().await;
            for title in titles {
                match cache.peek(title) {
                    Some(Some(target)) => {
                        targets.insert(title.clone(), target.clone());
                    }
                    Some(None) => {}
                    None => uncached.push(title.clone()),
                }
            }
        }

        if uncached.is_empty() {
            return Ok(targets);
        }

        let mut fetched = HashMap::new();
        self.select_in_chunks("redirects", "title, target", &uncached, |row| {
            fetched.insert(row.get::<String, _>("title"), row.get::<String, _>("target"));
        })
        .await?;

        {
            let mut cache = self.redirect_cache.write().await;
            for title in uncached {
                let target = fetched.get(&title).cloned();
                cache.put(title, target);
            }
        }

        targets.extend(fetched);
        Ok(targets)
    }
}
