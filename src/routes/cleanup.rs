//! POST /cleanup/:session_id: discard a session and its report file.

use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::SessionId;

pub async fn cleanup(
    Extension(manager): Extension<Arc<InterviewManager>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Value>, InterviewError> {
    manager.discard(&session_id).await?;
    Ok(Json(json!({ "success": true })))
}
