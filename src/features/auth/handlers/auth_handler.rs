use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use validator::Validate;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::LoginFormDto;
use crate::features::auth::model::Session;
use crate::features::auth::services::AuthService;
use crate::shared::constants::{ADMIN_HOME_PATH, ADMIN_LOGIN_PATH};
use crate::shared::cookies::{clear_cookie, set_cookie};
use crate::shared::flash::Flash;
use crate::shared::templates::render_template;
use crate::shared::toast::{Toast, ToastView};

#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
    pub session: Arc<SessionConfig>,
}

fn render_login(email: &str, toast: Option<&Toast>) -> Result<String> {
    render_template(
        "admin/login.html",
        context! {
            email => email,
            toast => toast.map(ToastView::from),
        },
    )
}

/// Login page; an existing session goes straight to the admin panel
pub async fn login_page(session: Option<Session>, flash: Flash) -> Result<Response> {
    if session.is_some() {
        return Ok(Redirect::to(ADMIN_HOME_PATH).into_response());
    }

    let consumed = flash.0.is_some();
    let html = render_login("", flash.0.as_ref())?;
    Ok(Flash::page(consumed, html))
}

/// Exchange the submitted credentials for a session cookie
pub async fn login(
    State(state): State<AuthState>,
    Form(dto): Form<LoginFormDto>,
) -> Result<Response> {
    if let Err(e) = dto.validate() {
        let toast = Toast::error(AppError::Validation(e.to_string()).to_string());
        let html = render_login(&dto.email, Some(&toast))?;
        return Ok((StatusCode::BAD_REQUEST, Flash::page(false, html)).into_response());
    }

    match state.service.login(&dto).await {
        Ok(issued) => {
            let cookie = set_cookie(
                &state.session.cookie_name,
                &issued.session.access_token,
                issued.expires_in,
                state.session.cookie_secure,
            )
            .ok_or_else(|| AppError::Internal("Access token is not a valid cookie".to_string()))?;

            let mut response = Redirect::to(ADMIN_HOME_PATH).into_response();
            response.headers_mut().append(header::SET_COOKIE, cookie);
            Ok(response)
        }
        Err(AppError::Unauthorized(message)) => {
            tracing::info!("Admin sign-in rejected: {}", message);
            let html = render_login(&dto.email, Some(&Toast::error(message)))?;
            Ok((StatusCode::UNAUTHORIZED, Flash::page(false, html)).into_response())
        }
        Err(e) => {
            tracing::error!("Admin sign-in failed: {}", e);
            let toast = Toast::error("Unable to sign in right now. Please try again.");
            let html = render_login(&dto.email, Some(&toast))?;
            Ok((StatusCode::BAD_GATEWAY, Flash::page(false, html)).into_response())
        }
    }
}

/// Drop the session cookie and revoke the session upstream
pub async fn logout(State(state): State<AuthState>, session: Option<Session>) -> Response {
    if let Some(session) = session {
        state.service.logout(&session).await;
    }

    let mut response = Redirect::to(ADMIN_LOGIN_PATH).into_response();
    if let Some(cookie) = clear_cookie(&state.session.cookie_name) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}
