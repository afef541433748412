//! HTTP-level tests driving the router with in-memory stores. The Postgres
//! pool is constructed lazily and never touched by the auth routes.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::util::ServiceExt;
use tower_http::cors::CorsLayer;

use session_token::{Claims, TOKEN_VERSION, sign_hs256};
use varco::api;
use varco::auth::{
    hash_password, AuthConfig, AuthState, MemoryCredentialStore, MemorySessionStore, Role,
    UserIdentity,
};

const ACCESS_SECRET: &str = "integration-access-secret";
const REFRESH_SECRET: &str = "integration-refresh-secret";
const ISSUER: &str = "https://api.varco.dev";
const AUDIENCE: &str = "varco";

async fn app() -> Router {
    let sessions = Arc::new(MemorySessionStore::new());
    let credentials = Arc::new(MemoryCredentialStore::new());
    credentials
        .insert(UserIdentity {
            id: "u1".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: hash_password("hunter2").expect("hash"),
            role: Role::Customer,
            is_active: true,
        })
        .await;

    let config = AuthConfig::new(
        SecretString::from(ACCESS_SECRET),
        SecretString::from(REFRESH_SECRET),
        "http://localhost:5173".to_string(),
    );
    let auth_state = AuthState::new(config, sessions, credentials);

    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://varco@localhost:5432/varco")
        .expect("lazy pool");

    api::router(auth_state, pool, CorsLayer::new())
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(
            r#"{{"email":"{email}","password":"{password}"}}"#
        )))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn expired_access_token(user_id: &str) -> String {
    let now = i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_secs(),
    )
    .expect("timestamp");
    let claims = Claims {
        v: TOKEN_VERSION,
        iss: ISSUER.to_string(),
        aud: AUDIENCE.to_string(),
        sub: user_id.to_string(),
        role: Some("customer".to_string()),
        iat: now - 960,
        exp: now - 60,
    };
    sign_hs256(ACCESS_SECRET.as_bytes(), &claims).expect("signable")
}

#[tokio::test]
async fn login_issues_tokens_in_header_and_cookie() {
    let app = app().await;
    let response = app
        .oneshot(login_request("alice@example.com", "hunter2"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let authorization = response
        .headers()
        .get(header::AUTHORIZATION)
        .expect("authorization header")
        .to_str()
        .expect("ascii");
    assert!(authorization.starts_with("Bearer "));

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie")
        .to_str()
        .expect("ascii");
    assert!(cookie.starts_with("varco_refresh="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["id"], "u1");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "customer");
}

#[tokio::test]
async fn login_normalizes_email_case() {
    let app = app().await;
    let response = app
        .oneshot(login_request(" Alice@Example.COM ", "hunter2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_reports_remaining_attempts() {
    let app = app().await;
    let response = app
        .oneshot(login_request("alice@example.com", "wrong"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "password_mismatch");
    assert_eq!(body["remaining_attempts"], 4);
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let app = app().await;
    let response = app
        .oneshot(login_request("nobody@example.com", "hunter2"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "user_not_found");
}

#[tokio::test]
async fn session_requires_authorization_header() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "login_required");
}

#[tokio::test]
async fn session_accepts_fresh_access_token() {
    let app = app().await;
    let login = app
        .clone()
        .oneshot(login_request("alice@example.com", "hunter2"))
        .await
        .expect("login");
    let authorization = login
        .headers()
        .get(header::AUTHORIZATION)
        .expect("header")
        .clone();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(header::AUTHORIZATION, authorization)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    // No renewal happened, so no new credentials are emitted.
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["role"], "customer");
}

#[tokio::test]
async fn expired_token_with_cookie_is_silently_renewed() {
    let app = app().await;
    let login = app
        .clone()
        .oneshot(login_request("alice@example.com", "hunter2"))
        .await
        .expect("login");
    let cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .expect("cookie")
        .to_str()
        .expect("ascii");
    let refresh_pair = cookie.split(';').next().expect("cookie pair").to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", expired_access_token("u1")),
                )
                .header(header::COOKIE, refresh_pair)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    // Rotation emits a replacement pair.
    let renewed = response
        .headers()
        .get(header::AUTHORIZATION)
        .expect("renewed access token")
        .to_str()
        .expect("ascii");
    assert!(renewed.starts_with("Bearer "));
    let renewed_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("rotated refresh cookie")
        .to_str()
        .expect("ascii");
    assert!(renewed_cookie.starts_with("varco_refresh="));

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "u1");
}

#[tokio::test]
async fn expired_token_without_cookie_is_unauthorized() {
    let app = app().await;
    app.clone()
        .oneshot(login_request("alice@example.com", "hunter2"))
        .await
        .expect("login");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", expired_access_token("u1")),
                )
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "refresh_token_missing");
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    let app = app().await;
    let login = app
        .clone()
        .oneshot(login_request("alice@example.com", "hunter2"))
        .await
        .expect("login");
    let authorization = login
        .headers()
        .get(header::AUTHORIZATION)
        .expect("header")
        .clone();

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .header(header::AUTHORIZATION, authorization.clone())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("logout");
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let clearing = logout
        .headers()
        .get(header::SET_COOKIE)
        .expect("clearing cookie")
        .to_str()
        .expect("ascii");
    assert!(clearing.contains("Max-Age=0"));

    // The revoked token is rejected from now on.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/session")
                .header(header::AUTHORIZATION, authorization)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
