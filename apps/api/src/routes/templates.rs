use axum::Json;
use serde::Serialize;

use crate::models::resume::Template;

#[derive(Debug, Serialize)]
pub struct TemplateDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// GET /api/v1/templates
///
/// The catalog the builder UI offers. Static — template definitions live in
/// code, not storage.
pub async fn handle_list_templates() -> Json<Vec<TemplateDescriptor>> {
    Json(vec![
        TemplateDescriptor {
            id: Template::Modern.as_str(),
            name: "Modern",
            description: "Clean design with blue accents and professional styling",
        },
        TemplateDescriptor {
            id: Template::Classic.as_str(),
            name: "Classic",
            description: "Traditional layout with a centered header",
        },
    ])
}
