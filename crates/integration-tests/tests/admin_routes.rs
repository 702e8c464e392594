//! CMS routes exercised with an in-memory session store.
//!
//! Signed-in flows need `PostgreSQL` and are ignored by default.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sqlx::PgPool;
use tower::ServiceExt;

use kestrel_admin::services::hash_password;
use kestrel_core::Email;
use kestrel_core::catalog::User;
use kestrel_core::db::UserRepository;
use kestrel_integration_tests::{admin_app, admin_app_with_pool, body_text};

async fn get(path: &str) -> axum::http::Response<Body> {
    admin_app()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_login_page_renders() {
    let response = get("/auth/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    for path in ["/", "/products", "/orders", "/messages", "/users/new"] {
        let response = get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/auth/login", "{path}");
    }
}

#[tokio::test]
async fn test_responses_are_not_cached() {
    let response = get("/auth/login").await;
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
}

#[tokio::test]
async fn test_stylesheet_served() {
    let response = get("/static/admin.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
}

const ADMIN_PASSWORD: &str = "switchgear-2026";

async fn create_admin(pool: &PgPool, email: &str) -> User {
    let hash = hash_password(ADMIN_PASSWORD).unwrap();
    UserRepository::new(pool)
        .create("Site Admin", &Email::parse(email).unwrap(), &hash, true)
        .await
        .unwrap()
}

/// Sign in through the login form and return the session cookie.
async fn sign_in(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "email={}&password={ADMIN_PASSWORD}",
                    email.replace('@', "%40")
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    cookie.split(';').next().unwrap().to_owned()
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    cookie: &str,
) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(path)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_admin_cannot_delete_own_account(pool: PgPool) {
    let admin = create_admin(&pool, "admin@kestrel.test").await;
    let app = admin_app_with_pool(pool.clone());
    let cookie = sign_in(&app, "admin@kestrel.test").await;

    let response = send(&app, "POST", &format!("/users/{}/delete", admin.id), &cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let still_there = UserRepository::new(&pool).get_by_id(admin.id).await.unwrap();
    assert!(still_there.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_admin_can_delete_other_account(pool: PgPool) {
    create_admin(&pool, "admin@kestrel.test").await;
    let other = create_admin(&pool, "other@kestrel.test").await;
    let app = admin_app_with_pool(pool.clone());
    let cookie = sign_in(&app, "admin@kestrel.test").await;

    let response = send(&app, "POST", &format!("/users/{}/delete", other.id), &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/users");
    assert!(UserRepository::new(&pool).get_by_id(other.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_demoted_admin_is_signed_out(pool: PgPool) {
    let admin = create_admin(&pool, "admin@kestrel.test").await;
    let app = admin_app_with_pool(pool.clone());
    let cookie = sign_in(&app, "admin@kestrel.test").await;

    let response = send(&app, "GET", "/products", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", "/", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<strong>1</strong> administrators"));

    UserRepository::new(&pool)
        .update(admin.id, &admin.name, &admin.email, false, None)
        .await
        .unwrap();

    let response = send(&app, "GET", "/products", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");

    // The session was flushed, so the login page no longer bounces to "/".
    let response = send(&app, "GET", "/auth/login", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_deleted_admin_is_signed_out(pool: PgPool) {
    let admin = create_admin(&pool, "admin@kestrel.test").await;
    let other = create_admin(&pool, "other@kestrel.test").await;
    let app = admin_app_with_pool(pool.clone());
    let cookie = sign_in(&app, "other@kestrel.test").await;

    UserRepository::new(&pool).delete(other.id).await.unwrap();

    let response = send(&app, "GET", "/", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");

    let response = send(&app, "POST", &format!("/users/{}/delete", admin.id), &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(UserRepository::new(&pool).get_by_id(admin.id).await.unwrap().is_some());
}
