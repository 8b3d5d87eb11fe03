use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::render::{Renderer, RendererKind};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Hand-built PDF path, used by the stored-résumé GET download.
    minimal_renderer: Arc<dyn Renderer>,
    /// HTML + external engine path, used by the inline POST download.
    html_renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        config: Config,
        minimal_renderer: Arc<dyn Renderer>,
        html_renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            db,
            config,
            minimal_renderer,
            html_renderer,
        }
    }

    /// Strategy selection — each download entry point names its path instead
    /// of reaching for a renderer directly.
    pub fn renderer(&self, kind: RendererKind) -> &dyn Renderer {
        match kind {
            RendererKind::Minimal => self.minimal_renderer.as_ref(),
            RendererKind::Html => self.html_renderer.as_ref(),
        }
    }
}
