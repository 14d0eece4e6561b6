//! Cookie header helpers over `axum-extra`'s cookie jar

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Value of the named cookie from the `Cookie` request header(s)
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

/// `Set-Cookie` value for an HttpOnly, SameSite=Lax cookie on `/`
pub fn set_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> Option<HeaderValue> {
    let max_age = Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX));
    let mut cookie = base_cookie(name, value);
    cookie.set_max_age(max_age);
    cookie.set_secure(secure);
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// `Set-Cookie` value that expires the named cookie
pub fn clear_cookie(name: &str) -> Option<HeaderValue> {
    let mut cookie = base_cookie(name, "");
    cookie.set_max_age(Duration::ZERO);
    HeaderValue::from_str(&cookie.to_string()).ok()
}

fn base_cookie<'c>(name: &'c str, value: &'c str) -> Cookie<'c> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}
