/// Extractors whose rejections are [`ApiError`]s
///
/// Axum's stock `Json` and `Path` reject with plain-text bodies. These
/// wrappers route the rejection through `ApiError` so every failure a client
/// sees has the JSON error shape.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use tower::Service as _;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        title: String,
    }

    async fn handler(ApiPath(id): ApiPath<i64>, ApiJson(_): ApiJson<Payload>) -> String {
        id.to_string()
    }

    async fn send(uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let mut app = Router::new().route("/items/:id", post(handler));
        let response = app
            .call(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_error() {
        let (status, body) = send("/items/1", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_validation_error() {
        let (status, body) = send("/items/1", r#"{"title": 7}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_json_error() {
        let (status, body) = send("/items/abc", r#"{"title": "x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }
}
