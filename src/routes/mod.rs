//! HTTP surface of the session gateway
//!
//! One handler file per boundary operation. Handlers get the shared
//! [`InterviewManager`] through an `Extension` and return `InterviewError` on
//! failure, which renders as `{"error": "..."}` with a matching status code.

mod chat;
mod cleanup;
mod download;
mod health;
mod sessions;
mod start;

use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::SessionId;

/// Body of `POST /start`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    /// Consultation topic; empty or missing means a general consultation
    #[serde(default)]
    pub topic: Option<String>,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Session being answered
    pub session_id: SessionId,
    /// Patient's answer to the current question
    pub answer: String,
}

/// Build the full axum router with CORS restricted to `allowed_origins`
pub fn build_router(manager: Arc<InterviewManager>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/start", post(start::start))
        .route("/chat", post(chat::chat))
        .route("/download/:session_id", get(download::download))
        .route("/cleanup/:session_id", post(cleanup::cleanup))
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/:session_id", get(sessions::session_info))
        .route("/health", get(health::health))
        .layer(cors_layer(allowed_origins))
        .layer(Extension(manager))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

impl InterviewError {
    /// HTTP status this error is reported with
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownSession(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::ArtifactNotReady(_) => StatusCode::NOT_FOUND,
            Self::SessionComplete(_) => StatusCode::CONFLICT,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for InterviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaitKind;

    #[test]
    fn status_mapping() {
        assert_eq!(
            InterviewError::unknown_session("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InterviewError::artifact_not_ready("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            InterviewError::timeout(WaitKind::FirstPrompt).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            InterviewError::session_complete("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            InterviewError::workflow("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
