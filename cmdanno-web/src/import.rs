//! Corpus import
//!
//! Seeds the url/tag tables from a tab-separated file of
//! `utility<TAB>url` lines. Blank lines and `#` comments are skipped.
//! Import is add-only and idempotent, so re-running with the same corpus is
//! harmless.

use crate::db::content;
use cmdanno_common::Result;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::warn;

/// Counts reported after an import run
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub associations: usize,
    pub skipped: usize,
}

/// Load a corpus file into the store
pub async fn load_corpus(pool: &SqlitePool, path: &Path) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)?;
    let mut summary = ImportSummary::default();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((utility, url)) = line.split_once('\t') else {
            warn!("{}:{}: no tab separator, line skipped", path.display(), line_no + 1);
            summary.skipped += 1;
            continue;
        };

        let utility = utility.trim();
        let url = url.trim();
        if utility.is_empty() || url.is_empty() {
            warn!("{}:{}: empty field, line skipped", path.display(), line_no + 1);
            summary.skipped += 1;
            continue;
        }

        let tag_id = content::get_or_create_tag(pool, utility).await?;
        let url_id = content::get_or_create_url(pool, url).await?;
        content::add_url_tag(pool, url_id, tag_id).await?;
        summary.associations += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdanno_common::db::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn import_creates_tags_urls_and_associations() {
        let pool = memory_pool().await;
        let corpus = format!("/tmp/cmdanno-corpus-{}.tsv", std::process::id());
        std::fs::write(
            &corpus,
            "# comment line\nfind\ta.com\nfind\tb.com\ntar\ta.com\n\nbadline\n",
        )
        .unwrap();

        let summary = load_corpus(&pool, Path::new(&corpus)).await.unwrap();
        assert_eq!(summary.associations, 3);
        assert_eq!(summary.skipped, 1);

        let find_urls = content::urls_for_tag(&pool, "find").await.unwrap();
        assert_eq!(find_urls, vec!["a.com".to_string(), "b.com".to_string()]);

        let _ = std::fs::remove_file(&corpus);
    }

    #[tokio::test]
    async fn import_is_idempotent() {
        let pool = memory_pool().await;
        let corpus = format!("/tmp/cmdanno-corpus-idem-{}.tsv", std::process::id());
        std::fs::write(&corpus, "find\ta.com\n").unwrap();

        load_corpus(&pool, Path::new(&corpus)).await.unwrap();
        load_corpus(&pool, Path::new(&corpus)).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_tags")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let _ = std::fs::remove_file(&corpus);
    }
}
