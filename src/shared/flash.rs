//! One-shot toasts carried across a redirect in a short-lived cookie.
//!
//! The cookie value is `kind:percent-encoded-message`. The page that reads
//! it clears it in the same response.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::shared::cookies::{clear_cookie, get_cookie, set_cookie};
use crate::shared::toast::{Toast, ToastKind};

pub const FLASH_COOKIE: &str = "flash";

const FLASH_MAX_AGE_SECS: u64 = 60;

pub fn encode(toast: &Toast) -> String {
    format!(
        "{}:{}",
        toast.kind.as_str(),
        urlencoding::encode(&toast.message)
    )
}

pub fn decode(value: &str) -> Option<Toast> {
    let (kind, message) = value.split_once(':')?;
    let message = urlencoding::decode(message).ok()?.into_owned();
    if message.is_empty() {
        return None;
    }
    Some(Toast {
        kind: ToastKind::parse(kind),
        message,
    })
}

/// 303 to `location` with `toast` queued for the next page
pub fn redirect_with_toast(location: &str, toast: &Toast) -> Response {
    let mut response = Redirect::to(location).into_response();
    if let Some(cookie) = set_cookie(FLASH_COOKIE, &encode(toast), FLASH_MAX_AGE_SECS, false) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// Toast queued by the previous response, if any
#[derive(Debug, Default)]
pub struct Flash(pub Option<Toast>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash(
            get_cookie(&parts.headers, FLASH_COOKIE).and_then(|value| decode(&value)),
        ))
    }
}

impl Flash {
    /// Wrap rendered HTML, expiring the flash cookie once it has been shown
    pub fn page(consumed: bool, html: String) -> Response {
        let mut response = Html(html).into_response();
        if consumed {
            if let Some(cookie) = clear_cookie(FLASH_COOKIE) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
        }
        response
    }
}
