//! POST /chat: submit an answer and return the next question or the report.

use std::sync::Arc;

use axum::{Extension, Json};

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::InterviewStep;

use super::ChatRequest;

pub async fn chat(
    Extension(manager): Extension<Arc<InterviewManager>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<InterviewStep>, InterviewError> {
    let step = manager
        .submit_answer(&request.session_id, &request.answer)
        .await?;
    Ok(Json(step))
}
