//! HTML-based PDF path.
//!
//! Builds a self-contained HTML document (inline styles, no external assets)
//! and hands it to an external HTML-to-PDF engine for rasterization. Unlike
//! the minimal path this one supports multi-line descriptions and the richer
//! per-template visuals: accent color, skill tags, header alignment.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::models::resume::ResumeDocument;
use crate::render::template::{Accent, TemplateRules};
use crate::render::{formatted_date_range, RenderError, Renderer};

// ────────────────────────────────────────────────────────────────────────────
// Engine boundary
// ────────────────────────────────────────────────────────────────────────────

/// Black-box rasterizer: HTML string in, PDF bytes out, A4 portrait.
#[async_trait]
pub trait HtmlToPdfEngine: Send + Sync {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Default engine: shells out to the `wkhtmltopdf` binary with tempfile
/// input/output. Every invocation is bounded by a timeout so a wedged engine
/// cannot hang the handling task.
pub struct WkhtmltopdfEngine {
    binary: String,
    timeout: Duration,
}

impl WkhtmltopdfEngine {
    pub fn new(binary: String, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Checks that the engine binary can be spawned at all. Called once at
    /// startup so a missing binary is surfaced in the logs, not first
    /// discovered by a user's download.
    pub async fn probe(&self) -> Result<(), RenderError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--version").kill_on_drop(true);
        let output = cmd
            .output()
            .await
            .map_err(|e| self.classify_spawn_error(e))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RenderError::EngineUnavailable(format!(
                "'{} --version' exited with {}",
                self.binary, output.status
            )))
        }
    }

    fn classify_spawn_error(&self, err: std::io::Error) -> RenderError {
        if err.kind() == std::io::ErrorKind::NotFound {
            RenderError::EngineUnavailable(format!("'{}' not found in PATH", self.binary))
        } else {
            RenderError::EngineFailure(err.to_string())
        }
    }
}

#[async_trait]
impl HtmlToPdfEngine for WkhtmltopdfEngine {
    async fn convert(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let mut input = tempfile::Builder::new()
            .suffix(".html")
            .tempfile()
            .map_err(|e| RenderError::EngineFailure(format!("tempfile: {e}")))?;
        input
            .write_all(html.as_bytes())
            .and_then(|_| input.flush())
            .map_err(|e| RenderError::EngineFailure(format!("tempfile write: {e}")))?;

        let output_file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| RenderError::EngineFailure(format!("tempfile: {e}")))?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--quiet")
            .arg("--page-size")
            .arg("A4")
            .arg("--orientation")
            .arg("Portrait")
            .arg("--encoding")
            .arg("utf-8")
            .arg(input.path())
            .arg(output_file.path())
            .kill_on_drop(true);

        debug!(binary = %self.binary, "invoking HTML-to-PDF engine");

        let result = tokio::time::timeout(self.timeout, cmd.output()).await;
        let output = match result {
            Err(_) => {
                return Err(RenderError::EngineFailure(format!(
                    "engine timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(e)) => return Err(self.classify_spawn_error(e)),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::EngineFailure(format!(
                "engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(output_file.path())
            .await
            .map_err(|e| RenderError::EngineFailure(format!("reading engine output: {e}")))?;
        if bytes.is_empty() {
            return Err(RenderError::EngineFailure(
                "engine produced empty output".to_string(),
            ));
        }
        Ok(bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct HtmlPdfRenderer {
    engine: Arc<dyn HtmlToPdfEngine>,
}

impl HtmlPdfRenderer {
    pub fn new(engine: Arc<dyn HtmlToPdfEngine>) -> Self {
        Self { engine }
    }

    /// Builds the self-contained HTML document for the given résumé.
    /// Exposed within the crate so tests can assert on markup without an
    /// engine installed.
    pub(crate) fn build_html(doc: &ResumeDocument) -> String {
        let rules = TemplateRules::for_template(doc.template);
        let style = Stylesheet::for_accent(rules.accent);
        let pi = &doc.personal_info;

        let mut html = String::with_capacity(8 * 1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>{}</title>\n",
            escape_html(if pi.full_name.trim().is_empty() {
                "Resume"
            } else {
                pi.full_name.trim()
            })
        ));
        html.push_str("<style>\n");
        html.push_str(&style.css());
        html.push_str("</style>\n</head>\n<body>\n<div class=\"resume\">\n");

        // Header: name plus one joined contact line, field order fixed.
        html.push_str("<div class=\"header\">\n");
        html.push_str(&format!(
            "<div class=\"name\">{}</div>\n",
            escape_html(pi.full_name.trim())
        ));
        let contact: Vec<String> = [
            pi.email.trim(),
            pi.phone.trim(),
            pi.address.trim(),
            pi.linked_in.trim(),
            pi.website.trim(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(escape_html)
        .collect();
        if !contact.is_empty() {
            html.push_str(&format!(
                "<div class=\"contact\">{}</div>\n",
                contact.join(&escape_html(rules.separator))
            ));
        }
        html.push_str("</div>\n");

        if !pi.summary.trim().is_empty() {
            html.push_str(&section_open(rules.summary_heading));
            html.push_str(&format!(
                "<div class=\"description\">{}</div>\n",
                escape_html(&pi.summary)
            ));
            html.push_str("</div>\n");
        }

        if !doc.experience.is_empty() {
            html.push_str(&section_open(rules.experience_heading));
            for exp in &doc.experience {
                let title = if rules.split_experience_header {
                    exp.position.trim().to_string()
                } else {
                    join_nonempty(&[exp.position.as_str(), exp.company.as_str()], ", ")
                };
                let sub = if rules.split_experience_header {
                    join_nonempty(&[exp.company.as_str(), exp.location.as_str()], " \u{2022} ")
                } else {
                    exp.location.trim().to_string()
                };
                let dates = formatted_date_range(&exp.start_date, &exp.end_date, exp.current);
                html.push_str(&entry(&title, &dates, &sub, &exp.description));
            }
            html.push_str("</div>\n");
        }

        if !doc.education.is_empty() {
            html.push_str(&section_open(rules.education_heading));
            for edu in &doc.education {
                let title = join_nonempty(&[edu.degree.as_str(), edu.field.as_str()], " in ");
                let mut sub = edu.institution.trim().to_string();
                if !edu.gpa.trim().is_empty() {
                    if !sub.is_empty() {
                        sub.push_str(" \u{2022} ");
                    }
                    sub.push_str(&format!("GPA: {}", edu.gpa.trim()));
                }
                let dates = formatted_date_range(&edu.start_date, &edu.end_date, false);
                html.push_str(&entry(&title, &dates, &sub, &edu.description));
            }
            html.push_str("</div>\n");
        }

        if !doc.projects.is_empty() {
            html.push_str(&section_open(rules.projects_heading));
            for project in &doc.projects {
                let mut sub = String::new();
                if !project.technologies.trim().is_empty() {
                    sub = format!("Technologies: {}", project.technologies.trim());
                }
                if !project.url.trim().is_empty() {
                    if !sub.is_empty() {
                        sub.push_str(" \u{2022} ");
                    }
                    sub.push_str(project.url.trim());
                }
                let dates =
                    formatted_date_range(&project.start_date, &project.end_date, project.current);
                html.push_str(&entry(&project.name, &dates, &sub, &project.description));
            }
            html.push_str("</div>\n");
        }

        if !doc.achievements.is_empty() {
            html.push_str(&section_open(rules.achievements_heading));
            for ach in &doc.achievements {
                let (title, sub) = if rules.split_experience_header {
                    (ach.title.trim().to_string(), ach.issuer.trim().to_string())
                } else {
                    (join_nonempty(&[ach.title.as_str(), ach.issuer.as_str()], ", "), String::new())
                };
                let dates = crate::render::month_label(&ach.date);
                html.push_str(&entry(&title, &dates, &sub, &ach.description));
            }
            html.push_str("</div>\n");
        }

        let skills = doc.visible_skills();
        if !skills.is_empty() {
            html.push_str(&section_open(rules.skills_heading));
            if style.skill_tags {
                html.push_str("<div class=\"skills\">\n");
                for skill in &skills {
                    html.push_str(&format!(
                        "<span class=\"skill-tag\">{}</span>\n",
                        escape_html(skill)
                    ));
                }
                html.push_str("</div>\n");
            } else {
                let joined: Vec<String> = skills.iter().map(|s| escape_html(s)).collect();
                html.push_str(&format!(
                    "<p class=\"skills-line\">{}</p>\n",
                    joined.join(&escape_html(rules.separator))
                ));
            }
            html.push_str("</div>\n");
        }

        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}

#[async_trait]
impl Renderer for HtmlPdfRenderer {
    async fn render(&self, doc: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
        let html = Self::build_html(doc);
        self.engine.convert(&html).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Markup helpers
// ────────────────────────────────────────────────────────────────────────────

/// Per-template CSS variables. Modern gets the blue accent, underlined
/// section titles and a left-aligned header; classic gets neutral dark,
/// uppercased letter-spaced titles and a centered header.
struct Stylesheet {
    accent_color: &'static str,
    header_align: &'static str,
    title_extra: &'static str,
    skill_tags: bool,
}

impl Stylesheet {
    fn for_accent(accent: Accent) -> Self {
        match accent {
            Accent::Primary => Stylesheet {
                accent_color: "#2563eb",
                header_align: "left",
                title_extra: "border-bottom: 2px solid #2563eb; padding-bottom: 4px;",
                skill_tags: true,
            },
            Accent::Neutral => Stylesheet {
                accent_color: "#1f2937",
                header_align: "center",
                title_extra: "text-transform: uppercase; letter-spacing: 2px;",
                skill_tags: false,
            },
        }
    }

    fn css(&self) -> String {
        format!(
            r#"body {{ margin: 0; padding: 24px; background: white; font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
.resume {{ max-width: 800px; margin: 0 auto; }}
.header {{ text-align: {align}; border-bottom: 3px solid {accent}; padding-bottom: 14px; margin-bottom: 20px; }}
.name {{ font-size: 30px; font-weight: bold; color: #1f2937; margin-bottom: 8px; }}
.contact {{ color: #6b7280; font-size: 13px; }}
.section {{ margin-bottom: 22px; }}
.section-title {{ font-size: 17px; font-weight: bold; color: {accent}; margin-bottom: 12px; {title_extra} }}
.entry {{ margin-bottom: 14px; }}
.entry-header {{ display: flex; justify-content: space-between; align-items: flex-start; }}
.entry-title {{ font-size: 15px; font-weight: 600; color: #1f2937; }}
.entry-date {{ color: #6b7280; font-size: 12px; white-space: nowrap; }}
.entry-subtitle {{ color: {accent}; font-weight: 500; font-size: 13px; margin: 2px 0 6px 0; }}
.description {{ color: #374151; font-size: 13px; white-space: pre-line; }}
.skills {{ display: flex; flex-wrap: wrap; gap: 8px; }}
.skill-tag {{ background-color: #dbeafe; color: #1e40af; padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: 500; }}
.skills-line {{ color: #374151; font-size: 13px; }}
"#,
            align = self.header_align,
            accent = self.accent_color,
            title_extra = self.title_extra,
        )
    }
}

fn section_open(title: &str) -> String {
    format!(
        "<div class=\"section\">\n<div class=\"section-title\">{}</div>\n",
        escape_html(title)
    )
}

/// One section entry: title/date header row, optional sub-line, optional
/// multi-line description (literal newlines preserved via pre-line).
fn entry(title: &str, dates: &str, subtitle: &str, description: &str) -> String {
    let mut out = String::from("<div class=\"entry\">\n<div class=\"entry-header\">\n");
    out.push_str(&format!(
        "<div class=\"entry-title\">{}</div>\n",
        escape_html(title.trim())
    ));
    if !dates.is_empty() {
        out.push_str(&format!(
            "<div class=\"entry-date\">{}</div>\n",
            escape_html(dates)
        ));
    }
    out.push_str("</div>\n");
    if !subtitle.trim().is_empty() {
        out.push_str(&format!(
            "<div class=\"entry-subtitle\">{}</div>\n",
            escape_html(subtitle.trim())
        ));
    }
    if !description.trim().is_empty() {
        out.push_str(&format!(
            "<div class=\"description\">{}</div>\n",
            escape_html(description)
        ));
    }
    out.push_str("</div>\n");
    out
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Escapes user-supplied text for HTML interpolation.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ExperienceEntry, PersonalInfo, Template};

    fn sample_document(template: Template) -> ResumeDocument {
        ResumeDocument {
            title: "My Resume".to_string(),
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-0100".to_string(),
                linked_in: "linkedin.com/in/jane".to_string(),
                summary: "First line.\nSecond line.".to_string(),
                ..Default::default()
            },
            experience: vec![ExperienceEntry {
                company: "Acme Corp".to_string(),
                position: "Engineer".to_string(),
                location: "Oslo".to_string(),
                start_date: "2022-03".to_string(),
                end_date: "junk".to_string(),
                current: true,
                description: "Did things.".to_string(),
                ..Default::default()
            }],
            skills: vec!["Rust".to_string(), "SQL".to_string(), "  ".to_string()],
            template,
            ..Default::default()
        }
    }

    #[test]
    fn test_user_text_is_html_escaped() {
        let mut doc = sample_document(Template::Modern);
        doc.personal_info.full_name = "<script>alert('x')</script>".to_string();
        let html = HtmlPdfRenderer::build_html(&doc);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_dates_formatted_with_present_override() {
        let html = HtmlPdfRenderer::build_html(&sample_document(Template::Modern));
        assert!(html.contains("Mar 2022 - Present"));
        assert!(!html.contains("junk"));
    }

    #[test]
    fn test_modern_and_classic_visuals_diverge() {
        let modern = HtmlPdfRenderer::build_html(&sample_document(Template::Modern));
        let classic = HtmlPdfRenderer::build_html(&sample_document(Template::Classic));

        assert!(modern.contains("PROFESSIONAL SUMMARY"));
        assert!(classic.contains("OBJECTIVE"));

        assert!(modern.contains("text-align: left"));
        assert!(classic.contains("text-align: center"));
        assert!(modern.contains("#2563eb"));
        assert!(classic.contains("letter-spacing"));

        // modern renders skill tags, classic one pipe-joined line
        assert!(modern.contains("skill-tag"));
        assert!(!classic.contains("skill-tag"));
        assert!(classic.contains("Rust | SQL"));
    }

    #[test]
    fn test_contact_line_field_order_and_separator() {
        let html = HtmlPdfRenderer::build_html(&sample_document(Template::Modern));
        assert!(html
            .contains("jane@example.com \u{2022} 555-0100 \u{2022} linkedin.com/in/jane"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let doc = ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let html = HtmlPdfRenderer::build_html(&doc);
        for heading in [
            "PROFESSIONAL SUMMARY",
            "WORK EXPERIENCE",
            "EDUCATION",
            "PROJECTS",
            "ACHIEVEMENTS",
            "SKILLS",
        ] {
            assert!(!html.contains(heading), "unexpected section {heading}");
        }
    }

    #[test]
    fn test_description_newlines_survive_escaping() {
        let html = HtmlPdfRenderer::build_html(&sample_document(Template::Modern));
        assert!(html.contains("First line.\nSecond line."));
        assert!(html.contains("white-space: pre-line"));
    }

    struct StubEngine {
        bytes: Vec<u8>,
    }

    #[async_trait]
    impl HtmlToPdfEngine for StubEngine {
        async fn convert(&self, _html: &str) -> Result<Vec<u8>, RenderError> {
            Ok(self.bytes.clone())
        }
    }

    #[tokio::test]
    async fn test_renderer_returns_engine_bytes_unmodified() {
        let renderer = HtmlPdfRenderer::new(Arc::new(StubEngine {
            bytes: b"%PDF-stub".to_vec(),
        }));
        let out = renderer
            .render(&sample_document(Template::Modern))
            .await
            .expect("stub engine succeeds");
        assert_eq!(out, b"%PDF-stub");
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_unavailable() {
        let engine = WkhtmltopdfEngine::new(
            "definitely-not-a-real-binary-3b1f".to_string(),
            Duration::from_secs(5),
        );
        match engine.probe().await {
            Err(RenderError::EngineUnavailable(_)) => {}
            other => panic!("expected EngineUnavailable, got {other:?}"),
        }
    }
}
