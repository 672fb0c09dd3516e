//! GET /sessions and GET /sessions/:session_id: session snapshots.

use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::{ListSessionsResponse, SessionId, SessionInfo};

pub async fn list_sessions(
    Extension(manager): Extension<Arc<InterviewManager>>,
) -> Json<ListSessionsResponse> {
    Json(manager.list_sessions().await)
}

pub async fn session_info(
    Extension(manager): Extension<Arc<InterviewManager>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionInfo>, InterviewError> {
    Ok(Json(manager.session_info(&session_id).await?))
}
