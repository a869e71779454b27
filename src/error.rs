use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Body could not be decoded; status comes from the axum rejection.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// One or more field validation failures.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn unauthorized(msg: &str) -> Self {
        AppError::Unauthorized(msg.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Rejected { status, .. } => *status,
            AppError::Validation(_) | AppError::Unprocessable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(errors) => {
                warn!(%status, errors = ?errors, "validation failed");
                json!({ "errors": errors })
            }
            AppError::Internal(e) => {
                error!(%status, error = ?e, "internal error");
                json!({ "error": "Internal server error" })
            }
            other => {
                warn!(%status, error = %other, "request rejected");
                json!({ "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::UsernameTaken) => {
                AppError::Unprocessable("Username already exists".into())
            }
            Some(StoreError::UnknownUser) => AppError::Unprocessable("User must exist".into()),
            None => AppError::Internal(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// `Json` extractor whose rejections render as `{"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn validation_errors_render_as_list() {
        let resp = AppError::Validation(vec!["a".into(), "b".into()]).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(resp).await, json!({ "errors": ["a", "b"] }));
    }

    #[tokio::test]
    async fn unauthorized_renders_single_error() {
        let resp = AppError::unauthorized("Not logged in").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await, json!({ "error": "Not logged in" }));
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let resp = AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn store_errors_are_recognised_through_anyhow() {
        let err = AppError::from(anyhow::Error::from(StoreError::UsernameTaken));
        assert!(matches!(err, AppError::Unprocessable(ref m) if m == "Username already exists"));

        let err = AppError::from(anyhow::anyhow!("boom"));
        assert!(matches!(err, AppError::Internal(_)));
    }
}
