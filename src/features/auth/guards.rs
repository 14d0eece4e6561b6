//! Session guard for the admin pages.
//!
//! API handlers take [`Session`] directly and answer 401 without one. HTML
//! handlers take [`AdminSession`], which redirects to the login page instead.
//! Either way the check runs as an extractor, before the handler body, so no
//! product data is requested for an anonymous visitor.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::features::auth::model::Session;
use crate::shared::constants::ADMIN_LOGIN_PATH;

/// Guard for admin pages.
///
/// # Example
/// ```ignore
/// pub async fn handler(AdminSession(session): AdminSession) { ... }
/// ```
pub struct AdminSession(pub Session);

pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to(ADMIN_LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(AdminSession(session.clone())),
            None => {
                tracing::debug!("No admin session, redirecting to login");
                Err(LoginRedirect)
            }
        }
    }
}
