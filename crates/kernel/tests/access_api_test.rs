#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests for the access-control API.

mod common;

use common::{OPERATOR_EMAIL, TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_api_requires_authentication() {
    let app = TestApp::new();

    let response = app.get("/api/blogs", None).await;
    assert_eq!(response.status(), 401);

    let response = app.get("/auth/me", None).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_invalid_identity_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json("/auth/session", None, &json!({ "token": "not-a-token" }))
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_resolves_user() {
    let app = TestApp::new();

    let cookie = app.login("ada@example.com").await;
    let response = app.get("/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "ada@example.com");
    // Display name falls back to the email's local part.
    assert_eq!(body["user"]["name"], "ada");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["super_admin"], false);
}

#[tokio::test]
async fn test_repeat_login_reuses_user() {
    let app = TestApp::new();

    let (_, first_id) = app.login_with_id("ada@example.com").await;
    let (_, second_id) = app.login_with_id("ada@example.com").await;

    assert_eq!(first_id, second_id);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();

    let cookie = app.login("ada@example.com").await;
    let response = app
        .post_json("/auth/logout", Some(&cookie), &json!({}))
        .await;
    assert_eq!(response.status(), 204);

    let response = app.get("/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_grant_revoke_round_trip_over_http() {
    let app = TestApp::new();

    // Owner creates a blog.
    let owner_cookie = app.login("owner@example.com").await;
    let response = app
        .post_json(
            "/api/blogs",
            Some(&owner_cookie),
            &json!({ "name": "Field Notes" }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let blog = body_json(response).await;
    let blog_id = blog["id"].as_i64().unwrap();

    // A second user holds no relation yet.
    let (editor_cookie, editor_id) = app.login_with_id("ed@example.com").await;
    let response = app
        .get(&format!("/api/blogs/{blog_id}"), Some(&editor_cookie))
        .await;
    assert_eq!(response.status(), 403);

    // Owner grants editor.
    let response = app
        .put_json(
            &format!("/api/blogs/{blog_id}/access/{editor_id}"),
            Some(&owner_cookie),
            &json!({ "role": "editor" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let row = body_json(response).await;
    assert_eq!(row["role"], "editor");

    // Editor can now read the blog, but not administer grants.
    let response = app
        .get(&format!("/api/blogs/{blog_id}"), Some(&editor_cookie))
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .put_json(
            &format!("/api/blogs/{blog_id}/access/{editor_id}"),
            Some(&editor_cookie),
            &json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(response.status(), 403);

    // Revoke; access is gone, and revoking again stays 204.
    let response = app
        .delete(
            &format!("/api/blogs/{blog_id}/access/{editor_id}"),
            Some(&owner_cookie),
        )
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .get(&format!("/api/blogs/{blog_id}"), Some(&editor_cookie))
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .delete(
            &format!("/api/blogs/{blog_id}/access/{editor_id}"),
            Some(&owner_cookie),
        )
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_grant_body_rejects_owner_role() {
    let app = TestApp::new();

    let owner_cookie = app.login("owner@example.com").await;
    let response = app
        .post_json(
            "/api/blogs",
            Some(&owner_cookie),
            &json!({ "name": "Field Notes" }),
        )
        .await;
    let blog_id = body_json(response).await["id"].as_i64().unwrap();

    let (_, other_id) = app.login_with_id("other@example.com").await;

    // `owner` is not representable in a grant body.
    let response = app
        .put_json(
            &format!("/api/blogs/{blog_id}/access/{other_id}"),
            Some(&owner_cookie),
            &json!({ "role": "owner" }),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_regrant_overwrites() {
    let app = TestApp::new();

    let owner_cookie = app.login("owner@example.com").await;
    let response = app
        .post_json(
            "/api/blogs",
            Some(&owner_cookie),
            &json!({ "name": "Field Notes" }),
        )
        .await;
    let blog_id = body_json(response).await["id"].as_i64().unwrap();

    let (_, editor_id) = app.login_with_id("ed@example.com").await;

    for role in ["editor", "admin"] {
        let response = app
            .put_json(
                &format!("/api/blogs/{blog_id}/access/{editor_id}"),
                Some(&owner_cookie),
                &json!({ "role": role }),
            )
            .await;
        assert_eq!(response.status(), 200);
    }

    let response = app
        .get(&format!("/api/blogs/{blog_id}/access"), Some(&owner_cookie))
        .await;
    assert_eq!(response.status(), 200);
    let rows = body_json(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["role"], "admin");
}

#[tokio::test]
async fn test_transfer_ownership() {
    let app = TestApp::new();

    let owner_cookie = app.login("owner@example.com").await;
    let response = app
        .post_json(
            "/api/blogs",
            Some(&owner_cookie),
            &json!({ "name": "Field Notes" }),
        )
        .await;
    let blog_id = body_json(response).await["id"].as_i64().unwrap();

    let (successor_cookie, successor_id) = app.login_with_id("successor@example.com").await;

    let response = app
        .put_json(
            &format!("/api/blogs/{blog_id}/owner"),
            Some(&owner_cookie),
            &json!({ "user_id": successor_id }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let blog = body_json(response).await;
    assert_eq!(blog["owner_id"].as_i64().unwrap(), successor_id);

    // The previous owner holds no relation anymore.
    let response = app
        .get(&format!("/api/blogs/{blog_id}"), Some(&owner_cookie))
        .await;
    assert_eq!(response.status(), 403);

    // The successor has owner-level access.
    let response = app
        .delete(&format!("/api/blogs/{blog_id}"), Some(&successor_cookie))
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_super_admin_bypass_over_http() {
    let app = TestApp::new();

    let operator_cookie = app.login(OPERATOR_EMAIL).await;

    // The decision endpoint shows the pinned bypass ordering: granted as
    // master even for a blog id that does not exist.
    let response = app
        .post_json(
            "/api/access/check",
            Some(&operator_cookie),
            &json!({ "blog_id": 9999, "required_role": "owner" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let decision = body_json(response).await;
    assert_eq!(decision["granted"], true);
    assert_eq!(decision["effective_role"], "master");

    // A regular user is told the blog does not exist.
    let user_cookie = app.login("ada@example.com").await;
    let response = app
        .post_json(
            "/api/access/check",
            Some(&user_cookie),
            &json!({ "blog_id": 9999, "required_role": "owner" }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let decision = body_json(response).await;
    assert_eq!(decision["granted"], false);
    assert_eq!(decision["reason"], "not_found");
}

#[tokio::test]
async fn test_user_admin_is_master_gated() {
    let app = TestApp::new();

    let user_cookie = app.login("ada@example.com").await;
    let response = app.get("/api/users", Some(&user_cookie)).await;
    assert_eq!(response.status(), 403);

    let operator_cookie = app.login(OPERATOR_EMAIL).await;
    let response = app.get("/api/users", Some(&operator_cookie)).await;
    assert_eq!(response.status(), 200);
    let users = body_json(response).await;
    // Both logins above created user rows.
    assert_eq!(users.as_array().unwrap().len(), 2);

    // Deleting a user cascades their grants.
    let ada_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "ada@example.com")
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    let response = app
        .delete(&format!("/api/users/{ada_id}"), Some(&operator_cookie))
        .await;
    assert_eq!(response.status(), 204);

    let response = app
        .delete(&format!("/api/users/{ada_id}"), Some(&operator_cookie))
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_blog_listing_is_scoped_to_caller() {
    let app = TestApp::new();

    let a_cookie = app.login("a@example.com").await;
    let b_cookie = app.login("b@example.com").await;

    for name in ["First", "Second"] {
        let response = app
            .post_json("/api/blogs", Some(&a_cookie), &json!({ "name": name }))
            .await;
        assert_eq!(response.status(), 201);
    }

    let response = app.get("/api/blogs", Some(&a_cookie)).await;
    let blogs = body_json(response).await;
    assert_eq!(blogs.as_array().unwrap().len(), 2);

    let response = app.get("/api/blogs", Some(&b_cookie)).await;
    let blogs = body_json(response).await;
    assert_eq!(blogs.as_array().unwrap().len(), 0);

    // Operators see everything.
    let operator_cookie = app.login(OPERATOR_EMAIL).await;
    let response = app.get("/api/blogs", Some(&operator_cookie)).await;
    let blogs = body_json(response).await;
    assert_eq!(blogs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_blog_name_must_not_be_empty() {
    let app = TestApp::new();

    let cookie = app.login("owner@example.com").await;
    let response = app
        .post_json("/api/blogs", Some(&cookie), &json!({ "name": "   " }))
        .await;
    assert_eq!(response.status(), 400);
}
