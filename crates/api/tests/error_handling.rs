//! Tests for `AppError` -> HTTP response mapping.
//!
//! No server or database: each test calls `IntoResponse` directly.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use claimflow_api::error::AppError;
use claimflow_core::error::CoreError;
use claimflow_core::roles::Role;
use claimflow_core::workflow::{self, Actor, ClaimAction, ClaimFacts, ClaimStatus, WorkflowPolicy};
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Claim",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Claim with id 42 not found");
}

#[tokio::test]
async fn unknown_action_returns_400() {
    let err: AppError = "escalate".parse::<ClaimAction>().unwrap_err().into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().starts_with("Unknown action"));
}

#[tokio::test]
async fn role_mismatch_returns_403() {
    let manager = Actor::for_claim(5, Role::Manager, 1, 2);
    let err = workflow::authorize(
        ClaimStatus::PendingInsurerReview,
        ClaimAction::Approve,
        &manager,
        WorkflowPolicy::default(),
        ClaimFacts::default(),
    )
    .unwrap_err();

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert!(json["error"].as_str().unwrap().starts_with("Forbidden"));
}

#[tokio::test]
async fn action_from_wrong_status_returns_409() {
    let creator = Actor::for_claim(1, Role::User, 1, 2);
    let err = workflow::authorize(
        ClaimStatus::Completed,
        ClaimAction::Submit,
        &creator,
        WorkflowPolicy::default(),
        ClaimFacts::default(),
    )
    .unwrap_err();

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Missing signature files in 'files'".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Missing signature files in 'files'");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::InternalError("disk full at /var/lib/uploads".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
