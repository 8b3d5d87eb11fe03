//! PDF rendering pipeline.
//!
//! Two renderer variants sit behind one `Renderer` trait: `MinimalPdfRenderer`
//! hand-builds a single-page binary PDF, `HtmlPdfRenderer` builds an HTML
//! document and defers rasterization to an external engine. Both honor the
//! same section ordering and presence rules from one `ResumeDocument`.

pub mod html_pdf;
pub mod minimal_pdf;
pub mod template;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::resume::ResumeDocument;

pub use html_pdf::{HtmlPdfRenderer, HtmlToPdfEngine, WkhtmltopdfEngine};
pub use minimal_pdf::MinimalPdfRenderer;

/// Failures of the external HTML-to-PDF engine. The minimal renderer has no
/// equivalent failure mode — it depends on nothing outside the process.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine failure: {0}")]
    EngineFailure(String),
}

/// Which render path a download entry point selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Hand-built single-page PDF — the stored-résumé GET path.
    Minimal,
    /// HTML + external engine — the inline POST path.
    Html,
}

/// One render call: document in, PDF bytes out. Rendering is pure and
/// request-scoped; implementations hold no per-call mutable state and may be
/// shared freely across concurrent requests.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, doc: &ResumeDocument) -> Result<Vec<u8>, RenderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Date labels
// ────────────────────────────────────────────────────────────────────────────

/// Formats a `YYYY-MM` date as a human label, e.g. "2022-03" → "Mar 2022".
/// Empty or malformed input yields an empty label, never an error.
pub(crate) fn month_label(date: &str) -> String {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
        Ok(d) => d.format("%b %Y").to_string(),
        Err(_) => String::new(),
    }
}

/// Raw date range for the minimal path: stored strings joined with " - ",
/// blank parts skipped, `current` overriding the end label with "Present".
pub(crate) fn raw_date_range(start: &str, end: &str, current: bool) -> String {
    let end_label = if current {
        "Present".to_string()
    } else {
        end.trim().to_string()
    };
    join_range(start.trim(), &end_label)
}

/// Formatted date range for the HTML path: month labels, "Present" override.
pub(crate) fn formatted_date_range(start: &str, end: &str, current: bool) -> String {
    let end_label = if current {
        "Present".to_string()
    } else {
        month_label(end)
    };
    join_range(&month_label(start), &end_label)
}

fn join_range(start: &str, end: &str) -> String {
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (false, false) => format!("{start} - {end}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_label_formats_year_month() {
        assert_eq!(month_label("2022-03"), "Mar 2022");
        assert_eq!(month_label("1999-12"), "Dec 1999");
    }

    #[test]
    fn test_month_label_tolerates_garbage() {
        assert_eq!(month_label(""), "");
        assert_eq!(month_label("  "), "");
        assert_eq!(month_label("not-a-date"), "");
        assert_eq!(month_label("2022-13"), "");
    }

    #[test]
    fn test_raw_date_range_present_override() {
        // end label must be exactly "Present" regardless of the stored end date
        assert_eq!(raw_date_range("2020-01", "2021-06", true), "2020-01 - Present");
        assert_eq!(raw_date_range("2020-01", "", true), "2020-01 - Present");
        assert_eq!(raw_date_range("", "", true), "Present");
    }

    #[test]
    fn test_raw_date_range_skips_blank_parts() {
        assert_eq!(raw_date_range("2020-01", "", false), "2020-01");
        assert_eq!(raw_date_range("", "2021-06", false), "2021-06");
        assert_eq!(raw_date_range("", "", false), "");
    }

    #[test]
    fn test_formatted_date_range() {
        assert_eq!(
            formatted_date_range("2020-01", "2021-06", false),
            "Jan 2020 - Jun 2021"
        );
        assert_eq!(
            formatted_date_range("2020-01", "2021-06", true),
            "Jan 2020 - Present"
        );
        assert_eq!(formatted_date_range("junk", "", false), "");
    }
}
