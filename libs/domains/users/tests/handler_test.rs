//! Handler tests for the Users domain
//!
//! These drive the router end to end without a listener:
//! - Credential exchange and the `Token` response header
//! - Bearer token enforcement on the directory routes
//! - Status codes and the error envelope

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret";

/// Plaintext "hashing" so tests do not pay for Argon2.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> UserResult<String> {
        Ok(format!("plain:{plaintext}"))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> UserResult<bool> {
        Ok(digest == format!("plain:{plaintext}"))
    }
}

async fn seeded_service() -> UserService<PlainHasher> {
    let service = UserService::with_hasher(PlainHasher, TokenConfig::new(SECRET));
    service.seed(seed::development_users()).await.unwrap();
    service
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str, pw: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            json!({ "email": email, "pw": pw }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let issued: AuthToken = json_body(response.into_body()).await;
    issued.token
}

fn ids(users: &[UserResponse]) -> Vec<&str> {
    users.iter().map(|u| u.id.as_str()).collect()
}

#[tokio::test]
async fn test_auth_returns_token_in_body_and_header() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            json!({ "email": "admin@passer.com", "pw": "pA22er.54321" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let header = response
        .headers()
        .get(handlers::TOKEN_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let issued: AuthToken = json_body(response.into_body()).await;
    assert_eq!(issued.token, header);
    assert_eq!(token::verify(&issued.token, SECRET), Ok(true));

    let claims: TokenClaims = token::decode_payload(&issued.token).unwrap();
    assert_eq!(claims.id, "admin@passer.com");
    assert_eq!(claims.name, "Admin PASSER");
    assert!(claims.has_role("ADMIN"));
}

#[tokio::test]
async fn test_auth_rejects_wrong_password() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            json!({ "email": "admin@passer.com", "pw": "Testing.12345" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"]["type"], "invalid_credentials");
}

#[tokio::test]
async fn test_auth_rejects_malformed_body() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            json!({ "email": "not-an-email", "pw": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_signup_returns_201_and_allows_login() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            json!({
                "email": "New.User@example.com",
                "name": { "first": "New", "last": "User" },
                "password": "Str0ng!pass",
                "roles": ["USER"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.id, "new.user@example.com");
    assert_eq!(user.status, Status::Pending);
    assert!(user.is_active);

    login(&app, "new.user@example.com", "Str0ng!pass").await;
}

#[tokio::test]
async fn test_signup_duplicate_returns_409() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            json!({
                "email": "joe.jet@gmail.com",
                "name": { "first": "Joe", "last": "Jet" },
                "password": "Testing.12345",
                "roles": ["AGENT"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_rejects_weak_password() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/signup",
            None,
            json!({
                "email": "weak@example.com",
                "name": { "first": "Weak", "last": "Pass" },
                "password": "password",
                "roles": ["USER"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_requires_token() {
    let app = handlers::router(seeded_service().await);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"]["type"], "unauthorized");

    let response = app
        .oneshot(empty_request("GET", "/users", Some("a.b")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"]["type"], "invalid_token");
}

#[tokio::test]
async fn test_users_rejects_foreign_token() {
    let app = handlers::router(seeded_service().await);
    let header = token::TokenHeader::default();
    let claims = TokenClaims {
        id: "admin@passer.com".to_string(),
        name: "Admin PASSER".to_string(),
        roles: vec!["ADMIN".to_string()],
        is_active: true,
        iss: "passer".to_string(),
        exp: token::now_millis() + 60_000,
    };
    let forged = token::issue(&header, &claims, "not-the-secret").unwrap();

    let response = app
        .oneshot(empty_request("GET", "/users", Some(&forged)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_orders() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let asc: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(asc.len(), 8);
    assert_eq!(asc[0].id, "admin@passer.com");
    assert_eq!(asc[7].id, "xy.lim@bestbuy.com");

    let response = app
        .oneshot(empty_request("GET", "/users?order=desc", Some(&token)))
        .await
        .unwrap();
    let desc: Vec<UserResponse> = json_body(response.into_body()).await;
    let mut reversed = ids(&asc);
    reversed.reverse();
    assert_eq!(ids(&desc), reversed);
}

#[tokio::test]
async fn test_status_transition_and_filter() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    for id in ["joe.jet@gmail.com", "alex.tao@gmail.com"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/users/{id}/status"),
                Some(&token),
                json!({ "status": "ready" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let user: UserResponse = json_body(response.into_body()).await;
        assert_eq!(user.status, Status::Ready);
    }

    let response = app
        .oneshot(empty_request("GET", "/users?status=ready", Some(&token)))
        .await
        .unwrap();
    let ready: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(ids(&ready), vec!["alex.tao@gmail.com", "joe.jet@gmail.com"]);
}

#[tokio::test]
async fn test_get_update_delete_user() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/users/jolin.lim@gmail.com", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["name"]["first"], "Jolin");
    assert!(body.get("passwordHash").is_none());

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/users/jolin.lim@gmail.com",
            Some(&token),
            json!({ "isActive": false, "roles": ["CONSUMER"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert!(!user.is_active);
    assert_eq!(user.roles, vec![Role::Consumer]);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/users/jolin.lim@gmail.com", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/users/jolin.lim@gmail.com", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_through_protected_route() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            Some(&token),
            json!({
                "email": "ops@passer.com",
                "name": { "first": "Ops", "last": "Team" },
                "password": "0ps!Passer",
                "isActive": false,
                "roles": ["AGENT", "USER"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth",
            None,
            json!({ "email": "ops@passer.com", "pw": "0ps!Passer" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_update_rejects_unknown_status_with_envelope() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/users/admin@passer.com/status",
            Some(&token),
            json!({ "status": "bogus" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_list_users_rejects_bad_query_with_envelope() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    for uri in ["/users?status=bogus", "/users?order=sideways"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri, Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["error"]["type"], "validation_error", "{uri}");
    }
}

#[tokio::test]
async fn test_bearer_scheme_is_case_insensitive() {
    let app = handlers::router(seeded_service().await);
    let token = login(&app, "admin@passer.com", "pA22er.54321").await;

    let request = Request::builder()
        .method("GET")
        .uri("/users")
        .header("authorization", format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
