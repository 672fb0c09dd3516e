//! GET /download/:session_id: the rendered report as an attachment.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::error::InterviewError;
use crate::manager::InterviewManager;
use crate::types::SessionId;

pub async fn download(
    Extension(manager): Extension<Arc<InterviewManager>>,
    Path(session_id): Path<SessionId>,
) -> Result<Response, InterviewError> {
    let document = manager.fetch_artifact(&session_id).await?;

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
