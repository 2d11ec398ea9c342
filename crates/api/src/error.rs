use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobbit_acquiring::AcquiringError;
use jobbit_core::error::CoreError;
use serde_json::json;

use crate::auth::otp::OtpError;

/// Message returned for a page number past the end of a list.
pub const INVALID_PAGE: &str = "Invalid page.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jobbit_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource addressed by name rather than id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A business-rule rejection reported as `{"detail": ...}` with 400.
    #[error("{0}")]
    Detail(String),

    /// A rejection reported as `{"err_detail": ...}` with 400.
    #[error("{0}")]
    ErrDetail(String),

    /// A page number past the last page.
    #[error("Invalid page")]
    InvalidPage,

    /// The payment provider failed or answered with something unusable.
    #[error(transparent)]
    Acquiring(#[from] AcquiringError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::Invalid => {
                AppError::Detail("Invalid token or code for given user".into())
            }
            OtpError::Token(e) => AppError::InternalError(format!("OTP token error: {e}")),
            OtpError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Plain-message rejections ---
            AppError::Detail(msg) => {
                return (StatusCode::BAD_REQUEST, axum::Json(json!({ "detail": msg })))
                    .into_response();
            }
            AppError::ErrDetail(msg) => {
                return (StatusCode::BAD_REQUEST, axum::Json(json!({ "err_detail": msg })))
                    .into_response();
            }
            AppError::InvalidPage => {
                return (
                    StatusCode::NOT_FOUND,
                    axum::Json(json!({ "detail": INVALID_PAGE })),
                )
                    .into_response();
            }

            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Acquirer errors ---
            AppError::Acquiring(err) => {
                tracing::error!(error = %err, "Acquirer error");
                (
                    StatusCode::BAD_GATEWAY,
                    "ACQUIRER_ERROR",
                    "Payment provider request failed".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Human message for a violated unique constraint.
fn unique_violation_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "User with given email address already exists".to_string(),
        "uq_users_phone_number" => "User with given phone number already exists".to_string(),
        "uq_client_profiles_user_id" => "Client profile already exists for this user".to_string(),
        "uq_executor_profiles_user_id" => {
            "Executor profile already exists for this user".to_string()
        }
        "uq_client_verifications_client_id" | "uq_executor_verifications_executor_id" => {
            "Verification for this profile already exists".to_string()
        }
        "uq_executor_addresses_executor_id" => {
            "Address for this executor already exists".to_string()
        }
        "uq_executor_geos_executor_id" => "Geo for this executor already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        unique_violation_message(constraint),
                    );
                }
            }
            // PostgreSQL foreign key violation: error code 23503
            if db_err.code().as_deref() == Some("23503") {
                return (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REFERENCE",
                    "Referenced object does not exist".to_string(),
                );
            }
            // PostgreSQL check constraint violation: error code 23514
            if db_err.code().as_deref() == Some("23514") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Value violates check constraint: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use uuid::Uuid;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn detail_uses_detail_key() {
        let (status, json) = body_of(AppError::Detail("Executor profile required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Executor profile required");
    }

    #[tokio::test]
    async fn err_detail_uses_err_detail_key() {
        let (status, json) = body_of(AppError::ErrDetail("no plans".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["err_detail"], "no plans");
    }

    #[tokio::test]
    async fn invalid_page_is_404() {
        let (status, json) = body_of(AppError::InvalidPage).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], INVALID_PAGE);
    }

    #[tokio::test]
    async fn not_found_names_entity() {
        let id = Uuid::nil();
        let (status, json) = body_of(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id,
        }))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], format!("Order with id {id} not found"));
    }

    #[tokio::test]
    async fn acquirer_failures_are_bad_gateway() {
        let err = AcquiringError::Api {
            status: 500,
            body: "boom".into(),
        };
        let (status, json) = body_of(AppError::Acquiring(err)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "ACQUIRER_ERROR");
    }

    #[tokio::test]
    async fn invalid_otp_is_a_detail() {
        let (status, json) = body_of(AppError::from(OtpError::Invalid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Invalid token or code for given user");
    }

    #[test]
    fn unique_messages() {
        assert_eq!(
            unique_violation_message("uq_users_email"),
            "User with given email address already exists"
        );
        assert!(unique_violation_message("uq_other").contains("uq_other"));
    }
}
