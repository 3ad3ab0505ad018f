//! Annotation row queries

use cmdanno_common::Result;
use sqlx::SqlitePool;

/// One displayable annotation: the command and its description
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnnotationView {
    pub command: String,
    pub nl: String,
}

/// Insert an annotation row. Duplicates of an existing triple are kept.
pub async fn insert(
    pool: &SqlitePool,
    url_id: i64,
    nl_id: i64,
    command_id: i64,
    annotator_id: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO annotations (url_id, nl_id, command_id, annotator_id) VALUES (?, ?, ?, ?)",
    )
    .bind(url_id)
    .bind(nl_id)
    .bind(command_id)
    .bind(annotator_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete every annotation matching the (url, nl, command) triple.
///
/// Deliberately unscoped: rows from ALL annotators are removed, matching the
/// collection tool's edit/delete semantics. Returns the number of rows
/// removed.
pub async fn delete_matching(
    pool: &SqlitePool,
    url_id: i64,
    nl_id: i64,
    command_id: i64,
) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM annotations WHERE url_id = ? AND nl_id = ? AND command_id = ?",
    )
    .bind(url_id)
    .bind(nl_id)
    .bind(command_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// True when any annotator has submitted for this URL
pub async fn exists_for_url(pool: &SqlitePool, url_id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM annotations WHERE url_id = ?)")
            .bind(url_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Annotations for a URL, deduplicated by (command, nl) and sorted by
/// command text. `annotator_id = None` returns every annotator's rows
/// (admin view); otherwise only the given annotator's.
pub async fn list_for_url(
    pool: &SqlitePool,
    url_id: i64,
    annotator_id: Option<i64>,
) -> Result<Vec<AnnotationView>> {
    let rows = match annotator_id {
        Some(annotator_id) => {
            sqlx::query_as::<_, AnnotationView>(
                r#"
                SELECT DISTINCT c.text AS command, n.text AS nl
                FROM annotations a
                JOIN commands c ON c.id = a.command_id
                JOIN nl_phrases n ON n.id = a.nl_id
                WHERE a.url_id = ? AND a.annotator_id = ?
                ORDER BY c.text
                "#,
            )
            .bind(url_id)
            .bind(annotator_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, AnnotationView>(
                r#"
                SELECT DISTINCT c.text AS command, n.text AS nl
                FROM annotations a
                JOIN commands c ON c.id = a.command_id
                JOIN nl_phrases n ON n.id = a.nl_id
                WHERE a.url_id = ?
                ORDER BY c.text
                "#,
            )
            .bind(url_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// URLs (by text) with at least one annotation from any annotator
pub async fn urls_with_annotations(pool: &SqlitePool) -> Result<Vec<String>> {
    let urls: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT u.text
        FROM annotations a
        JOIN urls u ON u.id = a.url_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(urls)
}
