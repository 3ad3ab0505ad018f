//! Progress status updates

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::auth::Annotator;
use super::ApiError;
use crate::db::{content, progress};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProgressParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: String,
}

/// GET /update_progress
///
/// Upserts the (user, url) progress record to the given status string. The
/// status is stored as-is; the UI sends "in-progress" and "completed".
pub async fn update_progress(
    State(state): State<AppState>,
    Annotator(user): Annotator,
    Query(params): Query<UpdateProgressParams>,
) -> Result<Json<Value>, ApiError> {
    let url_id = content::get_or_create_url(&state.db, &params.url).await?;
    progress::upsert(&state.db, user.id, url_id, &params.status).await?;

    Ok(super::json_status("PROGRESS_UPDATED"))
}
