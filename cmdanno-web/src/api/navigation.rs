//! Previous/next URL resolution within a utility's page sequence

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::Annotator;
use super::ApiError;
use crate::db::content;
use crate::navigation::{next_in, previous_in, Neighbor};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NavParams {
    #[serde(default)]
    pub utility: String,
    #[serde(default)]
    pub url: String,
}

/// GET /previous_url
pub async fn previous_url(
    State(state): State<AppState>,
    Annotator(_user): Annotator,
    Query(params): Query<NavParams>,
) -> Result<Json<Value>, ApiError> {
    let sequence = content::urls_for_tag(&state.db, params.utility.trim()).await?;

    let body = match previous_in(&sequence, params.url.trim()) {
        Neighbor::Found(url) => json!({ "status": "PREVIOUS_URL_SUCCESS", "url": url }),
        Neighbor::AtBoundary => json!({ "status": "IS_FIRST_URL" }),
        Neighbor::NotInSequence => json!({ "status": "URL_DOES_NOT_EXIST" }),
    };

    Ok(Json(body))
}

/// GET /next_url
pub async fn next_url(
    State(state): State<AppState>,
    Annotator(_user): Annotator,
    Query(params): Query<NavParams>,
) -> Result<Json<Value>, ApiError> {
    let sequence = content::urls_for_tag(&state.db, params.utility.trim()).await?;

    let body = match next_in(&sequence, params.url.trim()) {
        Neighbor::Found(url) => json!({ "status": "NEXT_URL_SUCCESS", "url": url }),
        Neighbor::AtBoundary => json!({ "status": "IS_LAST_URL" }),
        Neighbor::NotInSequence => json!({ "status": "URL_DOES_NOT_EXIST" }),
    };

    Ok(Json(body))
}
