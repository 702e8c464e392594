//! Public site routes that answer without touching the database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use kestrel_integration_tests::{body_text, site_app};

fn content_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pages")).unwrap();
    fs::write(
        dir.path().join("pages/about.md"),
        "---\ntitle: About Kestrel\ndescription: Switchgear since 1987.\n---\n\nWe build **switchgear**.\n",
    )
    .unwrap();
    dir
}

fn calculator_request(name: &str, body: &Value) -> Request<Body> {
    Request::post(format!("/api/calculators/{name}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-real-ip", "198.51.100.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = content_dir();
    let response = site_app(dir.path())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_about_page_rendered_from_markdown() {
    let dir = content_dir();
    let response = site_app(dir.path())
        .oneshot(Request::get("/about").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("About Kestrel"));
    assert!(html.contains("<strong>switchgear</strong>"));
}

#[tokio::test]
async fn test_missing_content_page_is_not_found() {
    let dir = content_dir();
    let response = site_app(dir.path())
        .oneshot(Request::get("/terms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let dir = content_dir();
    let response = site_app(dir.path())
        .oneshot(Request::get("/no-such-page").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_present() {
    let dir = content_dir();
    let response = site_app(dir.path())
        .oneshot(Request::get("/about").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_three_phase_power_api() {
    let dir = content_dir();
    let request = calculator_request(
        "three-phase-power",
        &json!({ "voltage": 400.0, "current": 100.0, "power_factor": 0.85 }),
    );
    let response = site_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["calculator"], "three-phase-power");

    // sqrt(3) * 400 V * 100 A * 0.85 = 58.89 kW
    let kw = body["results"][0]["value"].as_f64().unwrap();
    assert!((kw - 58.89).abs() < 0.01, "got {kw}");
    assert_eq!(body["results"][0]["unit"], "kW");
}

#[tokio::test]
async fn test_calculator_api_rejects_out_of_range_input() {
    let dir = content_dir();
    let request = calculator_request(
        "three-phase-power",
        &json!({ "voltage": 400.0, "current": 100.0, "power_factor": 1.4 }),
    );
    let response = site_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_calculator_is_not_found() {
    let dir = content_dir();
    let request = calculator_request("arc-flash", &json!({}));
    let response = site_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
