//! Access-code authentication
//!
//! Protected handlers take the [`Annotator`] extractor. A missing cookie or
//! an access code with no matching user row does not produce an error
//! status: the request is answered with the login page instead.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use cmdanno_common::db::models::User;

use crate::db::users;
use crate::AppState;

/// Name of the session cookie carrying the access code
pub const ACCESS_CODE_COOKIE: &str = "access_code";

/// The authenticated annotator, resolved from the access-code cookie
#[derive(Debug, Clone)]
pub struct Annotator(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Annotator {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let access_code = jar
            .get(ACCESS_CODE_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or(LoginRedirect)?;

        let user = users::safe_get(&state.db, &access_code)
            .await
            .ok_or(LoginRedirect)?;

        Ok(Annotator(user))
    }
}

/// Rejection that renders the login view rather than an error status
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        super::pages::login_html().into_response()
    }
}
