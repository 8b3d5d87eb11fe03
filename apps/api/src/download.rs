//! Download orchestration: validate the request, resolve a `ResumeDocument`,
//! pick the renderer for the entry point, and stream the bytes back as an
//! attachment. No side effects beyond reading storage.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::render::RendererKind;
use crate::resumes::store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub resume: Option<ResumeDocument>,
}

/// GET /api/v1/resumes/:id/download
///
/// Stored-résumé export: loads the caller's résumé and renders it through
/// the minimal PDF path.
pub async fn handle_download_stored(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let row = store::fetch_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    let doc = row.to_document();

    info!(resume_id = %id, template = doc.template.as_str(), "rendering stored resume");
    let bytes = state.renderer(RendererKind::Minimal).render(&doc).await?;
    Ok(pdf_attachment(&doc.title, bytes))
}

/// POST /api/v1/download
///
/// Inline export: renders a submitted résumé payload through the HTML path.
/// Anonymous callers are allowed — nothing is persisted.
pub async fn handle_download_inline(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(request): Json<DownloadRequest>,
) -> Result<Response, AppError> {
    let doc = request
        .resume
        .ok_or_else(|| AppError::Validation("resume payload is required".to_string()))?;

    match user_id {
        Some(user_id) => debug!(%user_id, "inline download"),
        None => debug!("anonymous inline download"),
    }
    let bytes = state.renderer(RendererKind::Html).render(&doc).await?;
    Ok(pdf_attachment(&doc.title, bytes))
}

/// Derives a filesystem-safe attachment filename from the résumé title:
/// every character outside `[A-Za-z0-9_-]` collapses to a single `_`, and a
/// title with nothing else left falls back to `resume`.
pub fn safe_filename(title: &str) -> String {
    let mut safe = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
            safe.push(c);
        } else if !safe.ends_with('_') {
            safe.push('_');
        }
    }
    if safe.trim_matches('_').is_empty() {
        safe = "resume".to_string();
    }
    format!("{safe}.pdf")
}

fn pdf_attachment(title: &str, pdf: Vec<u8>) -> Response {
    let filename = safe_filename(title);
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CONTENT_LENGTH, pdf.len().to_string()),
        ],
        Bytes::from(pdf),
    )
        .into_response()
}
