use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::bridge::BridgeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resume data validation failed")]
    InvalidResume(Vec<String>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        body: Value,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Name of the violated constraint when `e` is a unique violation.
pub fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    let db = e.as_database_error()?;
    if db.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    Some(db.constraint().unwrap_or_default())
}

fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "User already exists",
        "users_username_key" => "Username is already taken",
        _ => "Resource already exists",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut errors: Option<Vec<String>> = None;
        let mut details: Option<Value> = None;
        let mut upstream: Option<Value> = None;

        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidResume(list) => {
                errors = Some(list);
                (
                    StatusCode::BAD_REQUEST,
                    "Resume data validation failed".to_string(),
                )
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Upstream {
                status,
                message,
                body,
            } => {
                tracing::error!("Upstream error ({status}): {message}");
                upstream = Some(body);
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    message,
                )
            }
            AppError::Bridge(e) => {
                tracing::error!("Process bridge error: {e}");
                match e {
                    BridgeError::Timeout { label, .. } => (
                        StatusCode::GATEWAY_TIMEOUT,
                        format!("{label} timed out. Please try again."),
                    ),
                    BridgeError::Failed { label, stderr, .. } => {
                        details = Some(Value::String(stderr));
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("{label} failed"),
                        )
                    }
                    BridgeError::Reported { message, .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, message)
                    }
                }
            }
            AppError::Database(e) => {
                if let Some(constraint) = unique_violation(&e) {
                    (
                        StatusCode::BAD_REQUEST,
                        duplicate_message(constraint).to_string(),
                    )
                } else {
                    tracing::error!("Database error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "A database error occurred".to_string(),
                    )
                }
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }
        if let Some(details) = details {
            body["details"] = details;
        }
        if let Some(upstream) = upstream {
            body["error"] = upstream;
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_resume_lists_errors() {
        let response = AppError::InvalidResume(vec![
            "Personal information: Name is required".to_string(),
        ])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Resume data validation failed");
        assert_eq!(body["errors"][0], "Personal information: Name is required");
    }

    #[tokio::test]
    async fn test_bridge_timeout_is_gateway_timeout() {
        let response = AppError::from(BridgeError::Timeout {
            label: "ATS scorer".to_string(),
            timeout: Duration::from_secs(600),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_bridge_failure_carries_stderr_details() {
        let response = AppError::from(BridgeError::Failed {
            label: "OCR".to_string(),
            reason: "exited with 1".to_string(),
            stderr: "ModuleNotFoundError".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["details"], "ModuleNotFoundError");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = AppError::Internal(anyhow::anyhow!("disk on fire")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal server error occurred");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_duplicate_messages_by_constraint() {
        assert_eq!(duplicate_message("users_email_key"), "User already exists");
        assert_eq!(
            duplicate_message("users_username_key"),
            "Username is already taken"
        );
        assert_eq!(
            duplicate_message("portfolios_portfolio_id_key"),
            "Resource already exists"
        );
    }

    #[test]
    fn test_non_database_errors_are_not_unique_violations() {
        assert!(unique_violation(&sqlx::Error::RowNotFound).is_none());
    }

    #[tokio::test]
    async fn test_upstream_keeps_status() {
        let response = AppError::Upstream {
            status: 429,
            message: "Failed to fetch jobs".to_string(),
            body: json!({"error": "quota"}),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to fetch jobs");
        assert_eq!(body["error"]["error"], "quota");
    }
}
