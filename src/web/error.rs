//! API error type with structured JSON responses

use crate::domain::{ShasthoError, ValidationErrors};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Every failing field, only for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

/// Errors a handler can return, mapped onto HTTP statuses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] ShasthoError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Domain(ShasthoError::Authentication(
            "Authentication required".to_string(),
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                ShasthoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ShasthoError::NotFound(_) => StatusCode::NOT_FOUND,
                ShasthoError::Conflict(_) | ShasthoError::InvalidState(_) => StatusCode::CONFLICT,
                ShasthoError::Authentication(_) => StatusCode::UNAUTHORIZED,
                ShasthoError::Forbidden(_) => StatusCode::FORBIDDEN,
                ShasthoError::Configuration(_)
                | ShasthoError::Database(_)
                | ShasthoError::Serialization(_)
                | ShasthoError::Io(_)
                | ShasthoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, fields) = match self {
            ApiError::BadRequest(detail) => ("BAD_REQUEST", detail, None),
            ApiError::Domain(err) => match err {
                ShasthoError::Validation(errors) => (
                    "VALIDATION_FAILED",
                    "One or more fields are invalid".to_string(),
                    Some(errors),
                ),
                ShasthoError::NotFound(detail) => ("NOT_FOUND", detail, None),
                ShasthoError::Conflict(detail) => ("CONFLICT", detail, None),
                ShasthoError::InvalidState(detail) => ("INVALID_STATE", detail, None),
                ShasthoError::Authentication(detail) => ("AUTH_REQUIRED", detail, None),
                ShasthoError::Forbidden(detail) => ("FORBIDDEN", detail, None),
                internal => {
                    crate::log_error_with_context!(&internal, "Request failed");
                    (
                        "INTERNAL",
                        "An internal error occurred".to_string(),
                        None,
                    )
                }
            },
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                fields,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_422_with_every_field() {
        let mut errors = ValidationErrors::new();
        errors.push("full_name", "This field is required", None);
        errors.push("gender", "This field is required", None);
        let response = ApiError::from(ShasthoError::Validation(errors)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(json["error"]["fields"].as_array().unwrap().len(), 2);
        assert_eq!(json["error"]["fields"][1]["field"], "gender");
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::unauthorized().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
        assert!(json["error"].get("fields").is_none());
    }

    #[tokio::test]
    async fn invalid_state_and_conflict_return_409() {
        let conflict = ApiError::from(ShasthoError::Conflict("taken".into()));
        let state = ApiError::from(ShasthoError::InvalidState("done".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(state.status(), StatusCode::CONFLICT);
        let json = body_json(state.into_response()).await;
        assert_eq!(json["error"]["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn forbidden_and_not_found() {
        assert_eq!(
            ApiError::from(ShasthoError::Forbidden("no".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ShasthoError::NotFound("gone".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response =
            ApiError::from(ShasthoError::Database("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
