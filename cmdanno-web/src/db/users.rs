//! User lookup and registration queries

use cmdanno_common::db::models::User;
use cmdanno_common::Result;
use sqlx::SqlitePool;
use tracing::warn;

const USER_COLUMNS: &str = "id, access_code, first_name, last_name, is_admin";

/// Look up a user by access code
pub async fn find_by_access_code(pool: &SqlitePool, access_code: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE access_code = ?"
    ))
    .bind(access_code)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Look up a user by access code, degrading to None with a log line.
///
/// Page handlers treat a stale cookie as "logged out" rather than an error.
pub async fn safe_get(pool: &SqlitePool, access_code: &str) -> Option<User> {
    match find_by_access_code(pool, access_code).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            warn!("User {} does not exist", access_code);
            None
        }
        Err(e) => {
            warn!("User lookup failed for {}: {}", access_code, e);
            None
        }
    }
}

/// True when a user with this exact first/last name pair is registered
pub async fn name_exists(pool: &SqlitePool, first_name: &str, last_name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE first_name = ? AND last_name = ?)",
    )
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert a new user row
pub async fn create(
    pool: &SqlitePool,
    access_code: &str,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO users (access_code, first_name, last_name) VALUES (?, ?, ?)")
        .bind(access_code)
        .bind(first_name)
        .bind(last_name)
        .execute(pool)
        .await?;

    Ok(())
}
