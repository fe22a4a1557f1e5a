//! Request body extraction

use super::error::ApiError;
use crate::validation::FormData;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;

/// Submitted fields from a JSON object or a URL-encoded form
///
/// A request without a body yields an empty [`FormData`], so actions with
/// only optional fields (an approval note, say) can be posted bare.
#[derive(Debug, Clone)]
pub struct Submitted(pub FormData);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for Submitted {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(form) = Json::<FormData>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Submitted(form));
        }
        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<FormData>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Submitted(form));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            Ok(Submitted(FormData::new()))
        } else {
            Err(ApiError::BadRequest(
                "Send a JSON object or a URL-encoded form".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<FormData, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        Submitted::from_request(req, &()).await.map(|Submitted(f)| f)
    }

    #[tokio::test]
    async fn json_body() {
        let form = extract(Some("application/json"), r#"{"pulse": 80, "notes": "ok"}"#)
            .await
            .unwrap();
        assert_eq!(form.get("pulse"), Some("80"));
        assert_eq!(form.get("notes"), Some("ok"));
    }

    #[tokio::test]
    async fn urlencoded_body() {
        let form = extract(
            Some("application/x-www-form-urlencoded"),
            "username=nadia%40example.com&password=secret1",
        )
        .await
        .unwrap();
        assert_eq!(form.get("username"), Some("nadia@example.com"));
    }

    #[tokio::test]
    async fn empty_body_without_content_type() {
        let form = extract(None, "").await.unwrap();
        assert_eq!(form, FormData::new());
    }

    #[tokio::test]
    async fn unsupported_body_is_rejected() {
        assert!(matches!(
            extract(Some("text/plain"), "hello").await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            extract(Some("application/json"), "[1, 2]").await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
