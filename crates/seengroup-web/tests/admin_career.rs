mod common;

use axum::http::{header, Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{app, body_bytes, body_json, empty_request, json_request, send};
use seengroup_test_utils::{MockBackend, MockResponse};

const SESSION: Option<&str> = Some("adminToken=tok");

#[tokio::test]
async fn test_every_route_requires_session() {
    let backend = MockBackend::start().await;
    let cases = [
        ("GET", "/api/admin/career/jobs"),
        ("GET", "/api/admin/career/jobs/j1"),
        ("DELETE", "/api/admin/career/jobs/j1"),
        ("GET", "/api/admin/career/applications"),
        ("DELETE", "/api/admin/career/applications?id=a1"),
        ("GET", "/api/admin/career/applications/a1/resume"),
        ("GET", "/api/admin/career/applications/a1/cover-letter"),
    ];
    for (method, uri) in cases {
        let resp = send(app(&backend), empty_request(method, uri, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body_json(resp).await["message"], "Authentication required");
    }
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_job_listing_applies_defaults() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/api/admin/career/jobs",
        MockResponse::json(200, json!({"success": true, "data": [{"id": "j1"}]})),
    );

    let resp = send(app(&backend), empty_request("GET", "/api/admin/career/jobs?search=weld", SESSION)).await;
    assert_eq!(body_json(resp).await, json!({"success": true, "data": [{"id": "j1"}]}));

    let seen = backend.last().unwrap();
    assert_eq!(seen.header("authorization"), Some("Bearer tok"));
    assert_eq!(seen.query_param("status").as_deref(), Some("active"));
    assert_eq!(seen.query_param("sortBy").as_deref(), Some("createdAt"));
    assert_eq!(seen.query_param("sortOrder").as_deref(), Some("desc"));
    assert_eq!(seen.query_param("limit").as_deref(), Some("100"));
}

#[tokio::test]
async fn test_update_job_puts_id_in_body() {
    let backend = MockBackend::start().await;
    backend.on(Method::PUT, "/api/admin/career/jobs", MockResponse::json(200, json!({"success": true, "data": {}})));

    let req = json_request("PUT", "/api/admin/career/jobs/j5", SESSION, &json!({"title": "Lead Welder"}));
    let resp = send(app(&backend), req).await;
    assert_eq!(body_json(resp).await["message"], "Job updated successfully");
    assert_eq!(backend.last().unwrap().json(), json!({"title": "Lead Welder", "id": "j5"}));
}

#[tokio::test]
async fn test_delete_job_uses_query_id() {
    let backend = MockBackend::start().await;
    backend.on(Method::DELETE, "/api/admin/career/jobs", MockResponse::json(200, json!({"success": true})));
    let resp = send(app(&backend), empty_request("DELETE", "/api/admin/career/jobs/j%205", SESSION)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(backend.last().unwrap().query_param("id").as_deref(), Some("j 5"));
}

#[tokio::test]
async fn test_backend_failure_is_wrapped() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::POST,
        "/api/admin/career/jobs",
        MockResponse::json(422, json!({"success": false, "error": "Title is required"})),
    );
    let resp = send(app(&backend), json_request("POST", "/api/admin/career/jobs", SESSION, &json!({}))).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await, json!({"success": false, "message": "Title is required"}));
}

#[tokio::test]
async fn test_application_listing_is_transformed() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/api/career/applications",
        MockResponse::json(200, json!({
            "success": true,
            "data": [{
                "id": "a1", "name": "Ada", "email": "ada@example.com", "status": "PENDING",
                "createdAt": "2025-03-01T10:00:00Z",
                "jobs": {"id": "j1", "title": "Welder", "type": "full-time", "location": "Izmir"}
            }],
            "pagination": {"page": 1, "total": 1}
        })),
    );

    let resp = send(
        app(&backend),
        empty_request("GET", "/api/admin/career/applications?status=all&search=ada", SESSION),
    )
    .await;
    let body = body_json(resp).await;
    let app0 = &body["data"]["applications"][0];
    assert_eq!(app0["phone"], "");
    assert_eq!(app0["updatedAt"], "2025-03-01T10:00:00Z");
    assert_eq!(app0["job"]["isActive"], true);
    assert_eq!(body["data"]["pagination"], json!({"page": 1, "total": 1}));

    let seen = backend.last().unwrap();
    assert_eq!(seen.query_param("status"), None);
    assert_eq!(seen.query_param("page").as_deref(), Some("1"));
    assert_eq!(seen.query_param("limit").as_deref(), Some("10"));
}

#[tokio::test]
async fn test_status_patch_uppercases() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::PATCH,
        "/api/career/applications/a1/status",
        MockResponse::json(200, json!({"success": true, "data": {}})),
    );

    let missing = send(
        app(&backend),
        json_request("PATCH", "/api/admin/career/applications", SESSION, &json!({"status": "reviewed"})),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hits(), 0);

    let body = json!({"applicationId": "a1", "status": "reviewed"});
    send(app(&backend), json_request("PATCH", "/api/admin/career/applications", SESSION, &body)).await;
    assert_eq!(backend.last().unwrap().json(), json!({"status": "REVIEWED"}));
}

#[tokio::test]
async fn test_bulk_validation() {
    let backend = MockBackend::start().await;
    let uri = "/api/admin/career/applications/bulk";

    let empty = send(app(&backend), json_request("PATCH", uri, SESSION, &json!({"applicationIds": [], "action": "approve"}))).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let bad = send(app(&backend), json_request("PATCH", uri, SESSION, &json!({"applicationIds": ["a1"], "action": "archive"}))).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hits(), 0);

    backend.on(Method::PATCH, "/api/career/applications/bulk", MockResponse::json(200, json!({"success": true})));
    let ok = send(app(&backend), json_request("PATCH", uri, SESSION, &json!({"applicationIds": ["a1", "a2"], "action": "reject"}))).await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_json(ok).await["message"], "Bulk operations completed successfully");
}

#[tokio::test]
async fn test_email_requires_subject_and_message() {
    let backend = MockBackend::start().await;
    let uri = "/api/admin/career/applications/a1/email";
    let resp = send(app(&backend), json_request("POST", uri, SESSION, &json!({"subject": "Interview"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_resume_download_is_attachment() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/api/career/applications/a1/resume",
        MockResponse::bytes(200, "application/pdf", b"%PDF".to_vec())
            .with_header("content-disposition", "attachment; filename=\"ada_resume.pdf\""),
    );
    let resp = send(app(&backend), empty_request("GET", "/api/admin/career/applications/a1/resume", SESSION)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"ada_resume.pdf\""
    );
    assert_eq!(body_bytes(resp).await, b"%PDF".to_vec());
}

#[tokio::test]
async fn test_cover_letter_default_name() {
    let backend = MockBackend::start().await;
    backend.on(
        Method::GET,
        "/api/career/applications/a1/cover-letter",
        MockResponse::bytes(200, "application/octet-stream", b"bytes".to_vec()),
    );
    let resp = send(
        app(&backend),
        empty_request("GET", "/api/admin/career/applications/a1/cover-letter", SESSION),
    )
    .await;
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"cover_letter.pdf\""
    );
}
