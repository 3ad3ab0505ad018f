//! Annotation submission, editing, and deletion

use axum::extract::{Query, State};
use axum::Json;
use cmdanno_common::db::models::status;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::Annotator;
use super::ApiError;
use crate::db::{annotations, content, progress};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub nl: String,
    #[serde(default)]
    pub utility: String,
    #[serde(default)]
    pub command: String,
}

/// GET /submit_annotation
///
/// Resolves the four referenced entities, tags the command with the
/// utility, and records the annotation. Repeated submissions of the same
/// triple create additional rows. The (user, url) progress record is
/// created as "in-progress" on first submission and never demoted here.
pub async fn submit_annotation(
    State(state): State<AppState>,
    Annotator(user): Annotator,
    Query(params): Query<SubmitParams>,
) -> Result<Json<Value>, ApiError> {
    let url_id = content::get_or_create_url(&state.db, &params.url).await?;
    let nl_id = content::get_or_create_nl(&state.db, &params.nl).await?;
    let tag_id = content::get_or_create_tag(&state.db, &params.utility).await?;
    let command_id = content::get_or_create_command(&state.db, &params.command).await?;
    content::add_command_tag(&state.db, command_id, tag_id).await?;

    annotations::insert(&state.db, url_id, nl_id, command_id, user.id).await?;
    progress::create_if_absent(&state.db, user.id, url_id, status::IN_PROGRESS).await?;

    Ok(Json(json!({
        "status": "ANNOTATION_SAVED",
        "nl": params.nl.trim(),
        "command": params.command.trim(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct EditParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub original_nl: String,
    #[serde(default)]
    pub original_command: String,
    #[serde(default)]
    pub nl: String,
    #[serde(default)]
    pub command: String,
}

/// GET /submit_edit
///
/// Replaces an annotation: deletes every row matching
/// (url, original_nl, original_command), including other annotators'
/// matching rows, then inserts one new row for the acting user.
pub async fn submit_edit(
    State(state): State<AppState>,
    Annotator(user): Annotator,
    Query(params): Query<EditParams>,
) -> Result<Json<Value>, ApiError> {
    let url_id = content::get_or_create_url(&state.db, &params.url).await?;
    let original_nl_id = content::get_or_create_nl(&state.db, &params.original_nl).await?;
    let original_command_id =
        content::get_or_create_command(&state.db, &params.original_command).await?;
    let nl_id = content::get_or_create_nl(&state.db, &params.nl).await?;
    let command_id = content::get_or_create_command(&state.db, &params.command).await?;

    annotations::delete_matching(&state.db, url_id, original_nl_id, original_command_id).await?;
    annotations::insert(&state.db, url_id, nl_id, command_id, user.id).await?;

    Ok(Json(json!({
        "status": "EDIT_SAVED",
        "nl": params.nl.trim(),
        "command": params.command.trim(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub nl: String,
    #[serde(default)]
    pub command: String,
}

/// GET /delete_annotation
///
/// Deletes every row matching the (url, nl, command) triple, regardless of
/// annotator.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Annotator(_user): Annotator,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Value>, ApiError> {
    let url_id = content::get_or_create_url(&state.db, &params.url).await?;
    let nl_id = content::get_or_create_nl(&state.db, &params.nl).await?;
    let command_id = content::get_or_create_command(&state.db, &params.command).await?;

    annotations::delete_matching(&state.db, url_id, nl_id, command_id).await?;

    Ok(super::json_status("DELETION_SUCCESS"))
}
