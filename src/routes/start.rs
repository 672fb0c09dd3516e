//! POST /start: open a session and return its first question.

use std::sync::Arc;

use axum::{Extension, Json};

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::InterviewStep;

use super::StartRequest;

pub async fn start(
    Extension(manager): Extension<Arc<InterviewManager>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<InterviewStep>, InterviewError> {
    let topic = request.topic.unwrap_or_default();
    let step = manager.start(&topic).await?;
    Ok(Json(step))
}
