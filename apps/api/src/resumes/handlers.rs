//! Axum route handlers for the résumé CRUD API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumeRow};
use crate::resumes::store;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeRow>,
}

/// GET /api/v1/resumes
///
/// Lists the caller's résumés, newest first.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = store::list_for_user(&state.db, user_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = store::fetch_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// POST /api/v1/resumes
///
/// Persists a new résumé for the caller. The payload is the same document
/// shape the renderers consume; unknown template values are resolved here,
/// once, by deserialization.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(doc): Json<ResumeDocument>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    validate_payload(&doc)?;
    let resume = store::insert(&state.db, user_id, &doc).await?;
    tracing::info!(resume_id = %resume.id, "resume created");
    Ok((StatusCode::CREATED, Json(resume)))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(doc): Json<ResumeDocument>,
) -> Result<Json<ResumeRow>, AppError> {
    validate_payload(&doc)?;
    let resume = store::update_owned(&state.db, id, user_id, &doc)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = store::delete_owned(&state.db, id, user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_payload(doc: &ResumeDocument) -> Result<(), AppError> {
    if doc.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if doc.personal_info.full_name.trim().is_empty() {
        return Err(AppError::Validation(
            "personalInfo.fullName is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::PersonalInfo;

    fn valid_doc() -> ResumeDocument {
        ResumeDocument {
            title: "My Resume".to_string(),
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_minimal_payload() {
        assert!(validate_payload(&valid_doc()).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut doc = valid_doc();
        doc.title = "   ".to_string();
        assert!(matches!(
            validate_payload(&doc),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_name() {
        let mut doc = valid_doc();
        doc.personal_info.full_name = String::new();
        assert!(matches!(
            validate_payload(&doc),
            Err(AppError::Validation(_))
        ));
    }
}
