//! Content resolution queries
//!
//! The url/nl/command/tag tables are deduplicated by text. Resolution is an
//! idempotent upsert: INSERT OR IGNORE against the UNIQUE index, then a
//! lookup of the surviving row. The store enforces uniqueness, so concurrent
//! resolvers converge on the same row.

use cmdanno_common::{Error, Result};
use sqlx::SqlitePool;

/// Resolve a URL string to its row id, creating the row if absent
pub async fn get_or_create_url(pool: &SqlitePool, text: &str) -> Result<i64> {
    let text = text.trim();
    sqlx::query("INSERT OR IGNORE INTO urls (text) VALUES (?)")
        .bind(text)
        .execute(pool)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM urls WHERE text = ?")
        .bind(text)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Resolve a natural-language phrase to its row id, creating if absent
pub async fn get_or_create_nl(pool: &SqlitePool, text: &str) -> Result<i64> {
    let text = text.trim();
    sqlx::query("INSERT OR IGNORE INTO nl_phrases (text) VALUES (?)")
        .bind(text)
        .execute(pool)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM nl_phrases WHERE text = ?")
        .bind(text)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Resolve a command string to its row id, creating if absent
pub async fn get_or_create_command(pool: &SqlitePool, text: &str) -> Result<i64> {
    let text = text.trim();
    sqlx::query("INSERT OR IGNORE INTO commands (text) VALUES (?)")
        .bind(text)
        .execute(pool)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM commands WHERE text = ?")
        .bind(text)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Resolve a utility tag name to its row id, creating if absent
pub async fn get_or_create_tag(pool: &SqlitePool, name: &str) -> Result<i64> {
    let name = name.trim();
    sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Associate a command with a utility tag. Add-only.
pub async fn add_command_tag(pool: &SqlitePool, command_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO command_tags (command_id, tag_id) VALUES (?, ?)")
        .bind(command_id)
        .bind(tag_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Associate a URL with a utility tag. Add-only.
pub async fn add_url_tag(pool: &SqlitePool, url_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO url_tags (url_id, tag_id) VALUES (?, ?)")
        .bind(url_id)
        .bind(tag_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Look up the text of a URL row
pub async fn url_text(pool: &SqlitePool, url_id: i64) -> Result<String> {
    sqlx::query_scalar("SELECT text FROM urls WHERE id = ?")
        .bind(url_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("url id {}", url_id)))
}

/// All URLs carrying a utility tag, ordered lexicographically by URL text.
///
/// This ordering defines the navigation domain for the utility.
pub async fn urls_for_tag(pool: &SqlitePool, tag: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT u.text
        FROM url_tags ut
        JOIN urls u ON u.id = ut.url_id
        JOIN tags t ON t.id = ut.tag_id
        WHERE t.name = ?
        ORDER BY u.text
        "#,
    )
    .bind(tag)
    .fetch_all(pool)
    .await?;

    Ok(urls)
}

/// Tag usage counts across all tagged URLs, descending by count
pub async fn tag_usage_counts(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let counts: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT t.name, COUNT(*) AS url_count
        FROM url_tags ut
        JOIN tags t ON t.id = ut.tag_id
        GROUP BY t.name
        ORDER BY url_count DESC, t.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Utility tags referenced by at least one collected annotation's command
pub async fn tags_in_progress(pool: &SqlitePool) -> Result<Vec<String>> {
    let tags: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT t.name
        FROM annotations a
        JOIN command_tags ct ON ct.command_id = a.command_id
        JOIN tags t ON t.id = ct.tag_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}
