mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{app, body_json, empty_request, json_request, send, set_cookies};
use seengroup_test_utils::{MockBackend, MockResponse};

fn cookie_named<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    cookies.iter().find(|c| c.starts_with(&format!("{}=", name)))
}

#[tokio::test]
async fn test_login_challenge_sets_no_cookies() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/auth/login",
        MockResponse::json(202, json!({"success": true, "message": "Code sent", "data": {"otpId": "otp-1"}})),
    );

    let body = json!({"email": "admin@seengroup.com", "password": "hunter22", "rememberMe": true});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth", None, &body)).await;

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(
        body_json(resp).await,
        json!({"success": true, "message": "Code sent", "data": {"otpId": "otp-1"}})
    );
    assert_eq!(backend.last().unwrap().json()["rememberMe"], true);
}

#[tokio::test]
async fn test_login_without_challenge_sets_session() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/auth/login",
        MockResponse::json(200, json!({
            "success": true,
            "data": {"token": "tok", "refreshToken": "ref", "user": {"email": "admin@seengroup.com"}}
        })),
    );

    let body = json!({"email": "admin@seengroup.com", "password": "hunter22"});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies = set_cookies(&resp);
    let session = cookie_named(&cookies, "adminToken").expect("session cookie");
    assert!(session.contains("HttpOnly"));
    assert!(session.contains("SameSite=Lax"));
    assert!(session.contains("Secure"));
    assert!(session.contains("Max-Age=86400"));
    assert!(cookie_named(&cookies, "refreshToken").is_some());
    assert_eq!(body_json(resp).await["user"]["email"], "admin@seengroup.com");
}

#[tokio::test]
async fn test_login_failure_passes_status_and_message() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/auth/login",
        MockResponse::json(429, json!({"success": false, "message": "Too many attempts"})),
    );
    let body = json!({"email": "a@b.co", "password": "whatever"});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(body_json(resp).await["message"], "Too many attempts");
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let backend = MockBackend::start().await;
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth", None, &json!({"email": "a@b.co"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_verify_otp_success_sets_seven_day_cookies() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/auth/2fa/verify",
        MockResponse::json(200, json!({"success": true, "data": {"token": "tok", "user": {"id": "u1"}}})),
    );

    let body = json!({"otpId": "otp-1", "code": "123456"});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth/verify-otp", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies = set_cookies(&resp);
    let session = cookie_named(&cookies, "adminToken").expect("session cookie");
    assert!(session.contains("Max-Age=604800"));
    assert!(cookie_named(&cookies, "refreshToken").is_none());
    assert_eq!(
        body_json(resp).await,
        json!({"success": true, "message": "Authenticated", "user": {"id": "u1"}})
    );
    assert_eq!(backend.last().unwrap().json(), json!({"otpId": "otp-1", "code": "123456"}));
}

#[tokio::test]
async fn test_verify_otp_rejected_keeps_cookies_unset() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/auth/2fa/verify",
        MockResponse::json(401, json!({"success": false, "error": "Code expired"})),
    );
    let body = json!({"otpId": "otp-1", "code": "000000"});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth/verify-otp", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(body_json(resp).await["message"], "Code expired");
}

#[tokio::test]
async fn test_verify_otp_without_token_is_502() {
    let backend = MockBackend::start().await;
    backend.on(Method::POST, "/api/auth/2fa/verify", MockResponse::json(200, json!({"success": true, "data": {}})));
    let body = json!({"otpId": "otp-1", "code": "123456"});
    let resp = send(app(&backend), json_request("POST", "/api/admin/auth/verify-otp", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&resp).is_empty());
    assert_eq!(body_json(resp).await["message"], "Token missing in backend response");
}

#[tokio::test]
async fn test_resend_otp() {
    let backend = MockBackend::start().await;
    backend.on(Method::POST, "/api/auth/2fa/resend", MockResponse::json(200, json!({"success": true})));

    let missing = send(app(&backend), json_request("POST", "/api/admin/auth/resend-otp", None, &json!({}))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hits(), 0);

    let resp = send(
        app(&backend),
        json_request("POST", "/api/admin/auth/resend-otp", None, &json!({"otpId": "otp-1"})),
    )
    .await;
    assert_eq!(body_json(resp).await, json!({"success": true, "message": "New code sent"}));
}

#[tokio::test]
async fn test_session_validation() {
    let backend = MockBackend::start().await;
    let none = send(app(&backend), empty_request("GET", "/api/admin/auth", None)).await;
    assert_eq!(none.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.hits(), 0);

    backend.on(Method::GET, "/api/auth/verify", MockResponse::json(401, json!({"success": false})));
    let expired = send(app(&backend), empty_request("GET", "/api/admin/auth", Some("adminToken=old"))).await;
    assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(expired).await["message"], "Session expired");
    assert_eq!(backend.last().unwrap().header("authorization"), Some("Bearer old"));
}

#[tokio::test]
async fn test_logout_clears_cookies_even_when_backend_fails() {
    let backend = MockBackend::start().await;
    backend.on(Method::POST, "/api/auth/logout", MockResponse::json(500, json!({"success": false})));

    let cookie = Some("adminToken=tok; refreshToken=ref; csrfToken=c");
    let resp = send(app(&backend), empty_request("POST", "/api/admin/logout", cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies = set_cookies(&resp);
    for name in ["adminToken", "refreshToken", "csrfToken"] {
        let c = cookie_named(&cookies, name).unwrap_or_else(|| panic!("{} not cleared", name));
        assert!(c.contains("Max-Age=0"), "{}", c);
    }
    assert_eq!(body_json(resp).await["message"], "Logged out successfully");
    assert_eq!(backend.requests_to("/api/auth/logout").len(), 1);
}

#[tokio::test]
async fn test_logout_get_is_405() {
    let backend = MockBackend::start().await;
    let resp = send(app(&backend), empty_request("GET", "/api/admin/logout", None)).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_csrf_mints_once_and_reuses() {
    let backend = MockBackend::start().await;
    let fresh = send(app(&backend), empty_request("GET", "/api/admin/csrf", None)).await;
    let cookies = set_cookies(&fresh);
    let minted = cookie_named(&cookies, "csrfToken").expect("csrf cookie").clone();
    assert!(!minted.contains("HttpOnly"));
    let token = body_json(fresh).await["csrfToken"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 36);
    assert!(minted.starts_with(&format!("csrfToken={}", token)));

    let again = send(app(&backend), empty_request("GET", "/api/admin/csrf", Some("csrfToken=kept"))).await;
    assert!(set_cookies(&again).is_empty());
    assert_eq!(body_json(again).await, json!({"csrfToken": "kept"}));
}

#[tokio::test]
async fn test_change_password_checks_before_backend() {
    let backend = MockBackend::start().await;
    let short = json!({"currentPassword": "old-pass", "newPassword": "12345"});
    let resp = send(
        app(&backend),
        json_request("PUT", "/api/admin/change-password", Some("adminToken=tok"), &short),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "New password must be at least 6 characters");

    let ok = json!({"currentPassword": "old-pass", "newPassword": "123456"});
    let resp = send(app(&backend), json_request("PUT", "/api/admin/change-password", None, &ok)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.hits(), 0);

    backend.on(
        Method::PUT,
        "/api/auth/change-password",
        MockResponse::json(400, json!({"success": false, "error": "Current password is incorrect"})),
    );
    let resp = send(
        app(&backend),
        json_request("PUT", "/api/admin/change-password", Some("adminToken=tok"), &ok),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Current password is incorrect");
}
