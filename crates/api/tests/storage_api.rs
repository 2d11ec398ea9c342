//! HTTP-level integration tests for multipart uploads to local storage.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, build_test_app, get, send, user_with_token};
use http_body_util::BodyExt;
use sqlx::PgPool;

const BOUNDARY: &str = "jobbit-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";

fn multipart_body(field: &str, file_name: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/storage")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_stores_and_serves_image(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "uploader@example.com").await;

    let body = multipart_body("file", "../avatar me.png", "image/png", PNG_BYTES);
    let response = send(app.clone(), upload_request(Some(&token), body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["media_type"], "image/png");
    assert_eq!(json["size"], PNG_BYTES.len());
    let filename = json["filename"].as_str().unwrap();
    assert!(filename.ends_with("_avatarme.png"), "unexpected name {filename}");
    let url = json["url"].as_str().unwrap();
    assert_eq!(url, format!("/media/{filename}"));

    let response = get(app, url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(served.as_ref(), PNG_BYTES);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_requires_authentication(pool: PgPool) {
    let app = build_test_app(pool);

    let body = multipart_body("file", "avatar.png", "image/png", PNG_BYTES);
    let response = send(app, upload_request(None, body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_requires_file_field(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "uploader@example.com").await;

    let body = multipart_body("document", "avatar.png", "image/png", PNG_BYTES);
    let response = send(app, upload_request(Some(&token), body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Field `file` is required");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_rejects_unsupported_types(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "uploader@example.com").await;

    let body = multipart_body("file", "script.sh", "text/x-shellscript", b"#!/bin/sh\necho hi\n");
    let response = send(app.clone(), upload_request(Some(&token), body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Unsupported file type");

    // CSV is accepted by extension when the content is text.
    let body = multipart_body("file", "prices.csv", "text/plain", b"name,price\ntap,20\n");
    let response = send(app, upload_request(Some(&token), body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["media_type"], "text/csv");
}
