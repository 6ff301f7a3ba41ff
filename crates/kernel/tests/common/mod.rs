#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Tests drive the REAL application router; only the edges are swapped:
//! the in-memory store instead of PostgreSQL and an in-memory session
//! store instead of Redis. Identity tokens are minted against the same
//! secret the verifier is configured with.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use gazette_kernel::auth::JwtVerifier;
use gazette_kernel::routes;
use gazette_kernel::state::AppState;
use gazette_kernel::store::MemoryAccessStore;

/// Secret shared between minted test tokens and the verifier.
pub const TEST_SECRET: &str = "test-secret";

/// Allow-listed operator email used across tests.
pub const OPERATOR_EMAIL: &str = "admin@cbrazil.com";

/// Test application wrapper over the real router and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryAccessStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryAccessStore::new());
        let state = AppState::from_parts(
            store.clone(),
            Arc::new(JwtVerifier::new(TEST_SECRET)),
            vec![OPERATOR_EMAIL.to_string()],
        );

        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        let router = routes::router(state).layer(session_layer);

        Self { router, store }
    }

    /// Send a request through the router.
    pub async fn request(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Establish a session for `email` and return its cookie.
    pub async fn login(&self, email: &str) -> String {
        let token = identity_token(email);
        let response = self
            .post_json("/auth/session", None, &serde_json::json!({ "token": token }))
            .await;
        assert_eq!(response.status(), 200, "login failed for {email}");

        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login response carries a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Establish a session and return `(cookie, user_id)`.
    pub async fn login_with_id(&self, email: &str) -> (String, i64) {
        let cookie = self.login(email).await;
        let response = self.get("/auth/me", Some(&cookie)).await;
        let body = body_json(response).await;

        (cookie, body["user"]["id"].as_i64().unwrap())
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        self.request(build(Request::get(path), cookie, Body::empty()))
            .await
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> Response {
        self.request(build(Request::delete(path), cookie, Body::empty()))
            .await
    }

    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        cookie: Option<&str>,
        body: &T,
    ) -> Response {
        self.request(json_request(Request::post(path), cookie, body))
            .await
    }

    pub async fn put_json<T: Serialize>(
        &self,
        path: &str,
        cookie: Option<&str>,
        body: &T,
    ) -> Response {
        self.request(json_request(Request::put(path), cookie, body))
            .await
    }
}

fn build(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
    body: Body,
) -> Request<Body> {
    let builder = match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    };

    builder.body(body).unwrap()
}

fn json_request<T: Serialize>(
    builder: axum::http::request::Builder,
    cookie: Option<&str>,
    body: &T,
) -> Request<Body> {
    build(
        builder.header(header::CONTENT_TYPE, "application/json"),
        cookie,
        Body::from(serde_json::to_vec(body).unwrap()),
    )
}

/// Mint an identity token the way the provider would.
pub fn identity_token(email: &str) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        sub: String,
        email: &'a str,
        exp: u64,
    }

    encode(
        &Header::default(),
        &Claims {
            sub: format!("idp|{email}"),
            email,
            exp: 4_102_444_800, // 2100-01-01
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
