//! Annotation progress queries
//!
//! At most one row exists per (annotator, url); the primary key enforces it.

use cmdanno_common::db::models::AnnotationProgress;
use cmdanno_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Fetch the progress row for an (annotator, url) pair
pub async fn get(
    pool: &SqlitePool,
    annotator_id: i64,
    url_id: i64,
) -> Result<Option<AnnotationProgress>> {
    let row = sqlx::query_as::<_, AnnotationProgress>(
        "SELECT annotator_id, url_id, status FROM annotation_progress
         WHERE annotator_id = ? AND url_id = ?",
    )
    .bind(annotator_id)
    .bind(url_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Upsert the progress row for an (annotator, url) pair to the given status.
///
/// The status string is stored as-is; callers are expected to pass the
/// statuses the UI uses but others are not rejected.
pub async fn upsert(
    pool: &SqlitePool,
    annotator_id: i64,
    url_id: i64,
    status: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO annotation_progress (annotator_id, url_id, status)
        VALUES (?, ?, ?)
        ON CONFLICT(annotator_id, url_id) DO UPDATE SET
            status = excluded.status,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(annotator_id)
    .bind(url_id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(())
}

/// Create a progress row only when none exists for the pair yet.
///
/// Used on first annotation submission: an existing status (for example
/// "completed") must not be demoted by further submissions.
pub async fn create_if_absent(
    pool: &SqlitePool,
    annotator_id: i64,
    url_id: i64,
    status: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO annotation_progress (annotator_id, url_id, status) VALUES (?, ?, ?)",
    )
    .bind(annotator_id)
    .bind(url_id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(())
}

/// Map of url text -> status for one annotator, used by the URL panel
pub async fn statuses_for_annotator(
    pool: &SqlitePool,
    annotator_id: i64,
) -> Result<HashMap<String, String>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT u.text, p.status
        FROM annotation_progress p
        JOIN urls u ON u.id = p.url_id
        WHERE p.annotator_id = ?
        "#,
    )
    .bind(annotator_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}
