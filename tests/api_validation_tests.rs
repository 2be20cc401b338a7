// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! API input validation tests.
//!
//! All cases here are rejected before any database access, so they run
//! fully against the offline mock.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_add_favorite_requires_facility_id() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-123", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/favorites")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Missing field is rejected at deserialization
    assert!(
        response.status().is_client_error(),
        "expected 4xx, got {}",
        response.status()
    );
}

#[tokio::test]
async fn test_add_favorite_rejects_empty_facility_id() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-123", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/favorites")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"facility_id":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_profile_rejects_invalid_email() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-123", &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/profile")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"not-an-email"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_rejects_short_password() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/auth/resetpassword")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"token":"whatever","password":"short"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_avatar_upload_requires_multipart_file() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-123", &state.config.jwt_signing_key);

    let body = concat!(
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"unrelated\"\r\n\r\n",
        "value\r\n",
        "--boundary--\r\n",
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/profile/avatar")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(
                    header::CONTENT_TYPE,
                    "multipart/form-data; boundary=boundary",
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
