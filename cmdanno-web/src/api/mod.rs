//! HTTP API handlers for cmdanno-web

pub mod annotations;
pub mod auth;
pub mod health;
pub mod identity;
pub mod navigation;
pub mod pages;
pub mod progress;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Build the standard JSON body: payload plus a `status` field
pub fn json_status(status: &str) -> Json<Value> {
    Json(json!({ "status": status }))
}

/// Error type for JSON API handlers.
///
/// The collection workflow has no designed failure responses beyond the
/// statuses in the payload; anything else is a store failure surfaced as 500.
#[derive(Debug)]
pub struct ApiError(cmdanno_common::Error);

impl From<cmdanno_common::Error> for ApiError {
    fn from(err: cmdanno_common::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
