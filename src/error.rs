use anyhow::Result;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::Body;
use serde_json::json;

use crate::cors;

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Error: {}", self.0);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        cors::overlay(&mut headers);

        let body = json!({
            "error": "Proxy request failed",
            "message": self.0.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, headers, body.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Build a JSON error response. The CORS overlay is applied so failures stay
/// readable by browser-based callers.
pub fn json_error(status: StatusCode, body: serde_json::Value) -> Result<hyper::Response<Body>> {
    let mut response = hyper::Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;

    cors::overlay(response.headers_mut());

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn app_error_becomes_cors_json_500() {
        let err = AppError::from(anyhow!("connection refused"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Proxy request failed");
        assert_eq!(body["message"], "connection refused");
    }
}
