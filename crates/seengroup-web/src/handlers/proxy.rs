//! Authenticated forwarding proxy.
//!
//! Two mounts share one pipeline: authenticate, check CSRF, filter the query,
//! forward a fixed header set, then relay the backend's answer. Nothing is
//! kept between requests.

use axum::{
    body::{Body, Bytes},
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::Value;
use tracing::{debug, instrument};

use seengroup_common::ApiError;

use crate::session::{csrf_matches, is_safe_method, session_token};
use crate::state::SharedState;

/// Query parameters never forwarded upstream.
const STRIPPED_PARAMS: &[&str] = &["page", "limit"];

/// Response headers kept when streaming a non-JSON body.
const STREAMED_HEADERS: &[header::HeaderName] =
    &[header::CONTENT_TYPE, header::CONTENT_DISPOSITION, header::CONTENT_LENGTH];

/// How a non-JSON backend body is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonJson {
    Stream,
    Text,
}

/// One proxy mount.
#[derive(Debug, Clone, Copy)]
pub struct ProxyRoute {
    /// Upstream path prefix, joined with the captured path.
    pub upstream_prefix: &'static str,
    /// Captured paths under this prefix need no session and go to
    /// `{backend}/{path}` instead of under `upstream_prefix`.
    pub public_prefix: Option<&'static str>,
    pub non_json: NonJson,
    /// Skip the CSRF check in development.
    pub dev_csrf_leniency: bool,
}

impl ProxyRoute {
    pub const GENERAL: ProxyRoute = ProxyRoute {
        upstream_prefix: "/api/",
        public_prefix: Some("uploads/"),
        non_json: NonJson::Stream,
        dev_csrf_leniency: false,
    };

    pub const ADMIN: ProxyRoute = ProxyRoute {
        upstream_prefix: "/api/admin/",
        public_prefix: None,
        non_json: NonJson::Text,
        dev_csrf_leniency: true,
    };

    /// Only a path without dot or empty segments can be public.
    pub fn is_public(&self, path: &str) -> bool {
        is_clean_path(path) && self.public_prefix.is_some_and(|p| path.starts_with(p))
    }

    /// Upstream path (without query) for a captured path.
    pub fn upstream_path(&self, path: &str) -> String {
        if self.is_public(path) {
            format!("/{}", path)
        } else {
            format!("{}{}", self.upstream_prefix, path)
        }
    }
}

/// False when any segment is empty, `.` or `..`. The URL parser treats a backslash
/// as a separator for http, so it splits there too. A single trailing slash
/// is allowed.
pub fn is_clean_path(path: &str) -> bool {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    !trimmed.is_empty()
        && trimmed
            .split(|c| c == '/' || c == '\\')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// Drop pagination keys and empty values; keep the order of the rest.
pub fn filter_query(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if STRIPPED_PARAMS.contains(&key.as_ref()) || value.is_empty() {
            continue;
        }
        out.append_pair(&key, &value);
    }
    out.finish()
}

/// `ANY /api/proxy/{*path}`
pub async fn general_proxy(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    method: Method,
    jar: CookieJar,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, ApiError> {
    forward(&state, ProxyRoute::GENERAL, &path, method, &jar, &headers, query.as_deref(), body).await
}

/// `ANY /api/admin/proxy/{*path}`
pub async fn admin_proxy(
    State(state): State<SharedState>,
    Path(path): Path<String>,
    method: Method,
    jar: CookieJar,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Response, ApiError> {
    forward(&state, ProxyRoute::ADMIN, &path, method, &jar, &headers, query.as_deref(), body).await
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip(state, route, jar, headers, query, body), fields(upstream = route.upstream_prefix))]
pub async fn forward(
    state: &SharedState,
    route: ProxyRoute,
    path: &str,
    method: Method,
    jar: &CookieJar,
    headers: &HeaderMap,
    query: Option<&str>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !is_clean_path(path) {
        return Err(ApiError::BadRequest("Invalid path".into()));
    }
    let public = route.is_public(path);
    let token = session_token(jar);

    if token.is_none() && !public {
        return Err(ApiError::Unauthorized("Unauthorized".into()));
    }

    let lenient = route.dev_csrf_leniency && state.config.session.is_development();
    if !public && !is_safe_method(&method) && !lenient && !csrf_matches(jar, headers) {
        return Err(ApiError::Forbidden("Invalid CSRF token".into()));
    }

    let filtered = filter_query(query);
    let mut target = state.backend.url(&route.upstream_path(path));
    if !filtered.is_empty() {
        target.push('?');
        target.push_str(&filtered);
    }
    debug!(%method, %target, "forwarding");

    let mut req = state.backend.http().request(method.clone(), &target);
    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        req = req.header(header::CONTENT_TYPE, ct.clone());
    }
    if let Some(t) = &token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    if let Some(cookie) = headers.get(header::COOKIE) {
        req = req.header(header::COOKIE, cookie.clone());
    }
    if method != Method::GET && method != Method::HEAD {
        req = req.body(body);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::internal("Internal server error", e))?;

    relay(route.non_json, resp).await
}

async fn relay(non_json: NonJson, resp: reqwest::Response) -> Result<Response, ApiError> {
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.contains("application/json") {
        let data: Value = resp
            .json()
            .await
            .map_err(|e| ApiError::internal("Internal server error", e))?;
        return Ok((status, Json(data)).into_response());
    }

    match non_json {
        NonJson::Text => {
            let text = resp
                .text()
                .await
                .map_err(|e| ApiError::internal("Internal server error", e))?;
            Ok((status, text).into_response())
        }
        NonJson::Stream => {
            let mut builder = Response::builder().status(status);
            for name in STREAMED_HEADERS {
                if let Some(v) = resp.headers().get(name) {
                    builder = builder.header(name, v.clone());
                }
            }
            builder
                .body(Body::from_stream(resp.bytes_stream()))
                .map_err(|e| ApiError::internal("Internal server error", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_strips_pagination_and_empty() {
        assert_eq!(filter_query(Some("page=2&search=pump&limit=10&category=&sort=asc")), "search=pump&sort=asc");
        assert_eq!(filter_query(Some("page=1")), "");
        assert_eq!(filter_query(None), "");
    }

    #[test]
    fn test_filter_query_keeps_repeated_keys_in_order() {
        assert_eq!(filter_query(Some("tag=b&tag=a")), "tag=b&tag=a");
    }

    #[test]
    fn test_upstream_paths() {
        assert_eq!(ProxyRoute::GENERAL.upstream_path("products/42"), "/api/products/42");
        assert_eq!(ProxyRoute::GENERAL.upstream_path("uploads/a.png"), "/uploads/a.png");
        assert_eq!(ProxyRoute::ADMIN.upstream_path("settings"), "/api/admin/settings");
        assert_eq!(ProxyRoute::ADMIN.upstream_path("uploads/a.png"), "/api/admin/uploads/a.png");
    }

    #[test]
    fn test_public_paths() {
        assert!(ProxyRoute::GENERAL.is_public("uploads/resume.pdf"));
        assert!(!ProxyRoute::GENERAL.is_public("admin/settings"));
        assert!(!ProxyRoute::ADMIN.is_public("uploads/resume.pdf"));
        assert!(!ProxyRoute::GENERAL.is_public("uploads/../api/admin/settings"));
        assert!(!ProxyRoute::GENERAL.is_public("uploads/..\\api/admin/settings"));
    }

    #[test]
    fn test_dot_and_empty_segments_are_unclean() {
        assert!(is_clean_path("uploads/resume.pdf"));
        assert!(is_clean_path("products/"));
        assert!(is_clean_path("files/v1.2/a..b"));
        for bad in ["uploads/../api", "./products", "products/.", "a//b", "uploads\\..\\x", ""] {
            assert!(!is_clean_path(bad), "{:?}", bad);
        }
    }
}
