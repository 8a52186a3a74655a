//! Request helpers shared by the router-level tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    request(Method::POST, uri, None, Some(body))
}

/// Registers `email` and logs in, returning `(user_id, token)`.
pub async fn register_and_login(app: &Router, email: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        post_json(
            "/register",
            json!({"name": "Test User", "email": email, "password": "pa55word"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    let user_id = body["user"]["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        post_json("/login", json!({"email": email, "password": "pa55word"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let token = body["authentication_token"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    (user_id, token)
}
