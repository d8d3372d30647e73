//! Session cookies and the double-submit CSRF check.
//!
//! The gateway never decides whether a token is valid; that is the backend's
//! call. It only knows where the token lives and which cookie attributes to
//! set.

use axum::http::{HeaderMap, Method};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use seengroup_config::SessionConfig;

pub const SESSION_COOKIE: &str = "adminToken";
pub const REFRESH_COOKIE: &str = "refreshToken";
pub const CSRF_COOKIE: &str = "csrfToken";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Non-empty cookie value.
pub fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// The bearer token from `adminToken`, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    cookie_value(jar, SESSION_COOKIE)
}

/// GET, HEAD and OPTIONS never change state and skip the CSRF check.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Cookie and header both present and byte-for-byte equal.
pub fn csrf_matches(jar: &CookieJar, headers: &HeaderMap) -> bool {
    let cookie = cookie_value(jar, CSRF_COOKIE);
    let header = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());
    match (cookie, header) {
        (Some(c), Some(h)) => c == h,
        _ => false,
    }
}

/// Path `/`, SameSite=Lax, `Secure` outside development.
pub fn build_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    session: &SessionConfig,
    max_age_days: i64,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(session.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(max_age_days))
        .build()
}

/// Set `adminToken` and, when present, `refreshToken`.
pub fn with_session(
    jar: CookieJar,
    token: String,
    refresh: Option<String>,
    session: &SessionConfig,
    max_age_days: i64,
) -> CookieJar {
    let jar = jar.add(build_cookie(SESSION_COOKIE, token, true, session, max_age_days));
    match refresh {
        Some(r) => jar.add(build_cookie(REFRESH_COOKIE, r, true, session, max_age_days)),
        None => jar,
    }
}

/// Expire all three session cookies.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    [SESSION_COOKIE, REFRESH_COOKIE, CSRF_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| jar.remove(Cookie::build(name).path("/")))
}
