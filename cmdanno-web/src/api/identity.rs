//! Registration, login, and logout

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use cmdanno_common::db::models::User;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::auth::{Annotator, ACCESS_CODE_COOKIE};
use super::ApiError;
use crate::db::users;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

/// GET /register
///
/// Registers a new annotator. A repeated (first, last) pair reports
/// USER_EXISTS without creating a second row; the access code is derived
/// from the lowercased names.
pub async fn register_user(
    State(state): State<AppState>,
    Query(params): Query<RegisterParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if users::name_exists(&state.db, &params.firstname, &params.lastname).await? {
        return Ok(Json(json!({
            "status": "USER_EXISTS",
            "firstname": params.firstname,
            "lastname": params.lastname,
        })));
    }

    let access_code = User::derive_access_code(&params.firstname, &params.lastname);
    users::create(&state.db, &access_code, &params.firstname, &params.lastname).await?;
    info!("Registered annotator {}", access_code);

    Ok(Json(json!({
        "status": "REGISTRATION_SUCCESS",
        "firstname": params.firstname,
        "lastname": params.lastname,
        "access_code": access_code,
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub access_code: String,
}

/// GET /login
///
/// Sets the access-code cookie on success.
pub async fn user_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> Result<Response, ApiError> {
    match users::find_by_access_code(&state.db, &params.access_code).await? {
        Some(user) => {
            let cookie = Cookie::build((ACCESS_CODE_COOKIE, user.access_code.clone()))
                .path("/")
                .build();
            let body = Json(json!({
                "status": "LOGIN_SUCCESS",
                "access_code": user.access_code,
            }));
            Ok((jar.add(cookie), body).into_response())
        }
        None => Ok(super::json_status("USER_DOES_NOT_EXIST").into_response()),
    }
}

/// GET /logout
///
/// Clears the access-code cookie.
pub async fn user_logout(Annotator(_user): Annotator, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(ACCESS_CODE_COOKIE).path("/").build());
    (jar, super::json_status("LOGOUT_SUCCESS")).into_response()
}
