#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use seengroup_config::Config;
use seengroup_test_utils::MockBackend;
use seengroup_web::captcha::{CaptchaOutcome, CaptchaVerifier};
use seengroup_web::router::build_router;
use seengroup_web::state::AppState;

/// Verifier that accepts exactly one token.
pub struct FixedCaptcha(pub &'static str);

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn verify(&self, token: &str, _remote_ip: Option<&str>) -> CaptchaOutcome {
        if token == self.0 {
            CaptchaOutcome::Passed
        } else {
            CaptchaOutcome::Rejected(Value::Null)
        }
    }
}

pub fn config_for(backend: &MockBackend, environment: &str) -> Config {
    let url = backend.url();
    let environment = environment.to_string();
    Config::from_sources(None, move |key| match key {
        "BACKEND_URL" => Some(url.clone()),
        "APP_ENV" => Some(environment.clone()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn app(backend: &MockBackend) -> Router {
    app_in(backend, "production")
}

pub fn app_in(backend: &MockBackend, environment: &str) -> Router {
    let state = AppState::new(config_for(backend, environment))
        .expect("state")
        .with_captcha(Arc::new(FixedCaptcha("good-token")));
    build_router(state)
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.expect("router is infallible")
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

/// One multipart part: name, optional (file name, content type), payload.
pub struct Part<'a> {
    pub name: &'a str,
    pub file: Option<(&'a str, &'a str)>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &str) -> Self {
        Self { name, file: None, data: value.as_bytes().to_vec() }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self { name, file: Some((file_name, content_type)), data }
    }
}

pub const BOUNDARY: &str = "----seengroup-test-boundary";

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        part.name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .expect("request")
}
