//! Résumé data model.
//!
//! `ResumeDocument` is the value object both renderers consume. It is built
//! once per request — from a stored row or an inline payload — and is never
//! mutated by the render pipeline. Optional data degrades to empty strings at
//! construction time so the renderers never branch on "key present".

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Template identifier
// ────────────────────────────────────────────────────────────────────────────

/// The two supported visual templates.
///
/// Resolution happens exactly once, at deserialization: a missing field means
/// the payload was produced by the builder UI and gets its default, `Modern`;
/// any string other than `"modern"` falls back to `Classic`, the literal
/// branch both renderers treat as the safe path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Modern,
    Classic,
}

impl Template {
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "modern" => Template::Modern,
            _ => Template::Classic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Modern => "modern",
            Template::Classic => "classic",
        }
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Template::from_str_lossy(&s))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linked_in: String,
    pub website: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    /// Ignored when `current` is true — the rendered end label is "Present".
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: String,
    pub url: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AchievementEntry {
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate
// ────────────────────────────────────────────────────────────────────────────

/// The full résumé as both renderers see it. Read-only after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    /// Free text; doubles as the PDF filename basis and document subheading.
    pub title: String,
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub achievements: Vec<AchievementEntry>,
    pub skills: Vec<String>,
    pub template: Template,
}

impl ResumeDocument {
    /// Skills that survive whitespace trimming. Blank entries may remain
    /// stored, but they never render.
    pub fn visible_skills(&self) -> Vec<&str> {
        self.skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stored row
// ────────────────────────────────────────────────────────────────────────────

/// A persisted résumé, scoped by owner. Section payloads live in JSONB
/// columns holding the same camelCase shape the builder UI submits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub personal_info: Value,
    pub education: Value,
    pub experience: Value,
    pub projects: Value,
    pub achievements: Value,
    pub skills: Value,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Converts the stored row into the renderer-facing value object.
    ///
    /// Partial or missing JSON degrades to defaults — conversion never fails,
    /// so a half-filled résumé still produces a best-effort document.
    pub fn to_document(&self) -> ResumeDocument {
        ResumeDocument {
            title: self.title.clone(),
            personal_info: from_value_or_default(&self.personal_info),
            education: from_value_or_default(&self.education),
            experience: from_value_or_default(&self.experience),
            projects: from_value_or_default(&self.projects),
            achievements: from_value_or_default(&self.achievements),
            skills: from_value_or_default(&self.skills),
            template: Template::from_str_lossy(&self.template),
        }
    }
}

fn from_value_or_default<T: DeserializeOwned + Default>(value: &Value) -> T {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
