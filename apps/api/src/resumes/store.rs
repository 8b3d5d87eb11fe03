//! Owner-scoped persistence for résumé records.
//!
//! Every query is keyed by both résumé id and owner user id — a résumé owned
//! by someone else is indistinguishable from one that does not exist.

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, ResumeRow};

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<ResumeRow>, AppError> {
    let rows = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn fetch_owned(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    doc: &ResumeDocument,
) -> Result<ResumeRow, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        "INSERT INTO resumes \
         (id, user_id, title, personal_info, education, experience, projects, achievements, skills, template, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now(), now()) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&doc.title)
    .bind(to_json(&doc.personal_info)?)
    .bind(to_json(&doc.education)?)
    .bind(to_json(&doc.experience)?)
    .bind(to_json(&doc.projects)?)
    .bind(to_json(&doc.achievements)?)
    .bind(to_json(&doc.skills)?)
    .bind(doc.template.as_str())
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Returns `None` when no matching owned row exists.
pub async fn update_owned(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    doc: &ResumeDocument,
) -> Result<Option<ResumeRow>, AppError> {
    let row = sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes \
         SET title = $3, personal_info = $4, education = $5, experience = $6, \
             projects = $7, achievements = $8, skills = $9, template = $10, updated_at = now() \
         WHERE id = $1 AND user_id = $2 \
         RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(&doc.title)
    .bind(to_json(&doc.personal_info)?)
    .bind(to_json(&doc.education)?)
    .bind(to_json(&doc.experience)?)
    .bind(to_json(&doc.projects)?)
    .bind(to_json(&doc.achievements)?)
    .bind(to_json(&doc.skills)?)
    .bind(doc.template.as_str())
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Returns whether a row was actually deleted.
pub async fn delete_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}
