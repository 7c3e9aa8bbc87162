use crate::backend::ForwardRequest;
use crate::model::BackendReply;
use crate::proxy::ProxyState;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{error, info, warn};

/// Used when the backend rejected the upload without a usable `detail`.
pub const ANALYSIS_FAILED_MESSAGE: &str = "분석 중 오류가 발생했습니다.";
/// Used when the backend could not be reached or answered garbage.
pub const BACKEND_UNREACHABLE_MESSAGE: &str =
    "백엔드 서버에 연결할 수 없습니다. 서버가 실행 중인지 확인해주세요.";

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    detail: Option<Value>,
}

/// `POST /api/analyze`: forwards the multipart body untouched and relays the answer.
pub async fn analyze(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let started = Instant::now();
    info!("Forwarding upload ({} bytes) to {}", body.len(), state.backend.base_url());

    let request = ForwardRequest {
        content_type,
        body: body.to_vec(),
    };

    match state.backend.analyze(request).await {
        Ok(reply) => {
            let elapsed = started.elapsed();
            if (200..300).contains(&reply.status) {
                info!("Backend answered {} in {:?}", reply.status, elapsed);
            } else {
                warn!("Backend rejected upload with {} in {:?}", reply.status, elapsed);
            }
            relay(reply)
        }
        Err(e) => {
            error!("Backend call failed: {}", e);
            unreachable_response()
        }
    }
}

/// `GET /api/health`
pub async fn health(State(state): State<ProxyState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "backend_url": state.backend.base_url(),
    }))
}

/// Maps a backend reply to what the proxy sends back to the browser.
/// A success body is checked to be JSON and then relayed byte for byte.
pub fn relay(reply: BackendReply) -> Response {
    let Ok(status) = StatusCode::from_u16(reply.status) else {
        error!("Backend sent an invalid status code: {}", reply.status);
        return unreachable_response();
    };

    if status.is_success() {
        return match serde_json::from_slice::<serde::de::IgnoredAny>(&reply.body) {
            Ok(_) => (
                StatusCode::OK,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                reply.body,
            )
                .into_response(),
            Err(e) => {
                error!("Backend success body is not JSON: {}", e);
                unreachable_response()
            }
        };
    }

    let message = error_detail(&reply.body).unwrap_or_else(|| ANALYSIS_FAILED_MESSAGE.to_string());
    (status, Json(json!({ "error": message }))).into_response()
}

/// Pulls a non-empty string `detail` out of a backend error body.
fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: BackendErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        Value::String(detail) if !detail.is_empty() => Some(detail),
        _ => None,
    }
}

fn unreachable_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": BACKEND_UNREACHABLE_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> BackendReply {
        BackendReply {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    async fn parts(response: Response) -> (StatusCode, Option<String>, Vec<u8>) {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn json_parts(response: Response) -> (StatusCode, Value) {
        let (status, _, body) = parts(response).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn passes_detail_through_with_backend_status() {
        let (status, body) = json_parts(relay(reply(422, r#"{"detail":"bad image"}"#))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({"error": "bad image"}));
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back() {
        let (status, body) = json_parts(relay(reply(500, "Internal Server Error"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": ANALYSIS_FAILED_MESSAGE}));
    }

    #[tokio::test]
    async fn missing_or_structured_detail_falls_back() {
        let (status, body) = json_parts(relay(reply(400, r#"{"message":"nope"}"#))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": ANALYSIS_FAILED_MESSAGE}));

        let (status, body) = json_parts(relay(reply(422, r#"{"detail":[{"loc":["file"]}]}"#))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({"error": ANALYSIS_FAILED_MESSAGE}));

        let (_, body) = json_parts(relay(reply(400, r#"{"detail":""}"#))).await;
        assert_eq!(body, json!({"error": ANALYSIS_FAILED_MESSAGE}));
    }

    #[tokio::test]
    async fn success_body_is_relayed_byte_for_byte() {
        let raw = r#"{"sentiment":{"status":"중립","score":55},"prediction":{"up_probability":70,"down_probability":30},"technical_patterns":[]}"#;
        let (status, content_type, body) = parts(relay(reply(200, raw))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, raw.as_bytes());
    }

    #[tokio::test]
    async fn non_json_success_body_is_an_internal_error() {
        let (status, body) = json_parts(relay(reply(200, "<html>"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": BACKEND_UNREACHABLE_MESSAGE}));
    }
}
