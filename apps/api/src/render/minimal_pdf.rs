//! Minimal single-page PDF writer.
//!
//! Builds the PDF byte stream directly: six indirect objects (catalog, page
//! tree, page, two Type1 base fonts, content stream), a cross-reference table,
//! and a trailer. The core correctness invariant is byte-offset bookkeeping —
//! every offset recorded in the xref table must equal the position of the
//! matching `N 0 obj` token in the final stream, or strict parsers reject the
//! file.
//!
//! Layout is a fixed-delta cursor: y starts at 750 and each element drops it
//! by a constant, not by measured text metrics. Content past the bottom margin
//! is not detected or paginated; that is a documented limitation of this path,
//! kept for output compatibility with the legacy generator.

use async_trait::async_trait;

use crate::models::resume::ResumeDocument;
use crate::render::template::{Accent, TemplateRules};
use crate::render::{raw_date_range, RenderError, Renderer};

const LEFT_X: i32 = 72;
const CENTER_X: i32 = 306;
const TOP_Y: i32 = 750;

// Type tiers shared by both templates.
const SECTION_HEADING_SIZE: u8 = 20;
const ENTRY_TITLE_SIZE: u8 = 16;
const SUB_LINE_SIZE: u8 = 14;
const DATE_SIZE: u8 = 12;
const BODY_SIZE: u8 = 14;
const CONTACT_SIZE: u8 = 14;

const SECTION_HEADING_DROP: i32 = 30;
const SUMMARY_HEADING_DROP: i32 = 25;
const SKILLS_HEADING_DROP: i32 = 25;
const ENTRY_TITLE_DROP: i32 = 20;
const SUB_LINE_DROP: i32 = 18;
const DATE_DROP: i32 = 16;
const BODY_DROP: i32 = 20;
const CONTACT_DROP: i32 = 25;
const ENTRY_GAP: i32 = 10;

/// Per-accent display tiers. These reproduce the legacy generator's numbers;
/// they are deliberately not derived from font metrics.
struct DisplayTier {
    name_size: u8,
    name_drop: i32,
    subtitle_size: u8,
    subtitle_drop: i32,
    header_gap: i32,
    summary_heading_size: u8,
    summary_body_drop: i32,
    section_pre_gap: i32,
}

impl DisplayTier {
    fn for_accent(accent: Accent) -> Self {
        match accent {
            Accent::Primary => DisplayTier {
                name_size: 36,
                name_drop: 50,
                subtitle_size: 18,
                subtitle_drop: 30,
                header_gap: 30,
                summary_heading_size: 18,
                summary_body_drop: 45,
                section_pre_gap: 15,
            },
            Accent::Neutral => DisplayTier {
                name_size: 30,
                name_drop: 45,
                subtitle_size: 16,
                subtitle_drop: 25,
                header_gap: 25,
                summary_heading_size: 20,
                summary_body_drop: 40,
                section_pre_gap: 10,
            },
        }
    }
}

/// Font resources declared on the page object.
#[derive(Debug, Clone, Copy)]
enum Font {
    /// /F1 — Helvetica-Bold.
    Bold,
    /// /F2 — Helvetica.
    Regular,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Bold => "/F1",
            Font::Regular => "/F2",
        }
    }
}

/// Escapes text for the PDF literal-string syntax. Backslash is handled
/// first so later escapes are not doubled; carriage returns are stripped and
/// line feeds become the two-character `\n` token — the minimal path cannot
/// represent real line breaks, this only prevents syntax corruption.
pub(crate) fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\r' => {}
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Content stream builder
// ────────────────────────────────────────────────────────────────────────────

/// Accumulates `Tm`/`Tf`/`Tj` operator triplets while tracking the vertical
/// cursor. One instance per render call.
struct ContentStream {
    ops: String,
    y: i32,
}

impl ContentStream {
    fn new() -> Self {
        ContentStream {
            ops: String::from("BT\n"),
            y: TOP_Y,
        }
    }

    /// Emits one positioned text line, then drops the cursor by `drop`.
    fn line(&mut self, x: i32, font: Font, size: u8, text: &str, drop: i32) {
        self.ops
            .push_str(&format!("1 0 0 1 {x} {y} Tm\n", y = self.y));
        self.ops
            .push_str(&format!("{res} {size} Tf\n", res = font.resource()));
        self.ops
            .push_str(&format!("({}) Tj\n", escape_pdf_text(text)));
        self.y -= drop;
    }

    fn gap(&mut self, drop: i32) {
        self.y -= drop;
    }

    fn finish(mut self) -> String {
        self.ops.push_str("ET\n");
        self.ops
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// The hand-built PDF path. Stateless; rendering is deterministic — identical
/// documents yield byte-identical output.
pub struct MinimalPdfRenderer;

impl MinimalPdfRenderer {
    /// Renders the document to a complete PDF byte stream. Infallible:
    /// missing optional fields produce omitted lines, never errors.
    pub fn render_bytes(&self, doc: &ResumeDocument) -> Vec<u8> {
        let rules = TemplateRules::for_template(doc.template);
        let content = build_content(doc, &rules);

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = [0usize; 6];

        offsets[0] = pdf.len();
        pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets[1] = pdf.len();
        pdf.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        offsets[2] = pdf.len();
        pdf.push_str(
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>\nendobj\n",
        );

        offsets[3] = pdf.len();
        pdf.push_str("4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>\nendobj\n");

        offsets[4] = pdf.len();
        pdf.push_str("5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n");

        offsets[5] = pdf.len();
        pdf.push_str(&format!(
            "6 0 obj\n<< /Length {len} >>\nstream\n{content}\nendstream\nendobj\n",
            len = content.len(),
        ));

        let xref_pos = pdf.len();
        pdf.push_str("xref\n0 7\n");
        pdf.push_str("0000000000 65535 f \n");
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }

        pdf.push_str(&format!(
            "trailer\n<< /Size 7 /Root 1 0 R >>\nstartxref\n{xref_pos}\n%%EOF"
        ));

        pdf.into_bytes()
    }
}

#[async_trait]
impl Renderer for MinimalPdfRenderer {
    async fn render(&self, doc: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_bytes(doc))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section emission
// ────────────────────────────────────────────────────────────────────────────

fn build_content(doc: &ResumeDocument, rules: &TemplateRules) -> String {
    let tier = DisplayTier::for_accent(rules.accent);
    let mut cs = ContentStream::new();
    let pi = &doc.personal_info;

    // Header block: name, subtitle, contact line, address — all centered.
    if !pi.full_name.trim().is_empty() {
        cs.line(CENTER_X, Font::Bold, tier.name_size, &pi.full_name, tier.name_drop);
    }
    if !doc.title.trim().is_empty() {
        cs.line(
            CENTER_X,
            Font::Regular,
            tier.subtitle_size,
            &doc.title,
            tier.subtitle_drop,
        );
    }
    let contact: Vec<&str> = [pi.email.trim(), pi.phone.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !contact.is_empty() {
        cs.line(
            CENTER_X,
            Font::Regular,
            CONTACT_SIZE,
            &contact.join(rules.separator),
            CONTACT_DROP,
        );
    }
    if !pi.address.trim().is_empty() {
        cs.line(CENTER_X, Font::Regular, CONTACT_SIZE, &pi.address, CONTACT_DROP);
    }
    cs.gap(tier.header_gap);

    if !pi.summary.trim().is_empty() {
        cs.line(
            LEFT_X,
            Font::Bold,
            tier.summary_heading_size,
            rules.summary_heading,
            SUMMARY_HEADING_DROP,
        );
        cs.line(LEFT_X, Font::Regular, BODY_SIZE, &pi.summary, tier.summary_body_drop);
    }

    emit_experience(&mut cs, doc, rules, &tier);
    emit_education(&mut cs, doc, rules, &tier);
    emit_projects(&mut cs, doc, rules, &tier);
    emit_achievements(&mut cs, doc, rules, &tier);
    emit_skills(&mut cs, doc, rules, &tier);

    cs.finish()
}

fn emit_experience(
    cs: &mut ContentStream,
    doc: &ResumeDocument,
    rules: &TemplateRules,
    tier: &DisplayTier,
) {
    if doc.experience.is_empty() {
        return;
    }
    cs.gap(tier.section_pre_gap);
    cs.line(
        LEFT_X,
        Font::Bold,
        SECTION_HEADING_SIZE,
        rules.experience_heading,
        SECTION_HEADING_DROP,
    );

    for exp in &doc.experience {
        if rules.split_experience_header {
            if !exp.position.trim().is_empty() {
                cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &exp.position, ENTRY_TITLE_DROP);
            }
            if !exp.company.trim().is_empty() {
                cs.line(LEFT_X, Font::Regular, SUB_LINE_SIZE, &exp.company, SUB_LINE_DROP);
            }
        } else {
            let header = join_nonempty(&[exp.position.as_str(), exp.company.as_str()], ", ");
            if !header.is_empty() {
                cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &header, ENTRY_TITLE_DROP);
            }
        }

        let dates = raw_date_range(&exp.start_date, &exp.end_date, exp.current);
        if !dates.is_empty() {
            cs.line(LEFT_X, Font::Regular, DATE_SIZE, &dates, DATE_DROP);
        }
        if !exp.description.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, BODY_SIZE, &exp.description, BODY_DROP);
        }
        cs.gap(ENTRY_GAP);
    }
}

fn emit_education(
    cs: &mut ContentStream,
    doc: &ResumeDocument,
    rules: &TemplateRules,
    tier: &DisplayTier,
) {
    if doc.education.is_empty() {
        return;
    }
    cs.gap(tier.section_pre_gap);
    cs.line(
        LEFT_X,
        Font::Bold,
        SECTION_HEADING_SIZE,
        rules.education_heading,
        SECTION_HEADING_DROP,
    );

    for edu in &doc.education {
        let degree_text = join_nonempty(&[edu.degree.as_str(), edu.field.as_str()], " in ");
        if !degree_text.is_empty() {
            cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &degree_text, ENTRY_TITLE_DROP);
        }
        if !edu.institution.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, SUB_LINE_SIZE, &edu.institution, SUB_LINE_DROP);
        }

        let mut dates = raw_date_range(&edu.start_date, &edu.end_date, false);
        if !edu.gpa.trim().is_empty() {
            if dates.is_empty() {
                dates = format!("GPA: {}", edu.gpa.trim());
            } else {
                dates.push_str(&format!(" | GPA: {}", edu.gpa.trim()));
            }
        }
        if !dates.is_empty() {
            cs.line(LEFT_X, Font::Regular, DATE_SIZE, &dates, DATE_DROP);
        }
        if !edu.description.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, BODY_SIZE, &edu.description, BODY_DROP);
        }
        cs.gap(ENTRY_GAP);
    }
}

fn emit_projects(
    cs: &mut ContentStream,
    doc: &ResumeDocument,
    rules: &TemplateRules,
    tier: &DisplayTier,
) {
    if doc.projects.is_empty() {
        return;
    }
    cs.gap(tier.section_pre_gap);
    cs.line(
        LEFT_X,
        Font::Bold,
        SECTION_HEADING_SIZE,
        rules.projects_heading,
        SECTION_HEADING_DROP,
    );

    for project in &doc.projects {
        if !project.name.trim().is_empty() {
            cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &project.name, ENTRY_TITLE_DROP);
        }
        if !project.technologies.trim().is_empty() {
            let tech = format!("Technologies: {}", project.technologies.trim());
            cs.line(LEFT_X, Font::Regular, SUB_LINE_SIZE, &tech, SUB_LINE_DROP);
        }
        if !project.url.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, SUB_LINE_SIZE, &project.url, SUB_LINE_DROP);
        }

        let dates = raw_date_range(&project.start_date, &project.end_date, project.current);
        if !dates.is_empty() {
            cs.line(LEFT_X, Font::Regular, DATE_SIZE, &dates, DATE_DROP);
        }
        if !project.description.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, BODY_SIZE, &project.description, BODY_DROP);
        }
        cs.gap(ENTRY_GAP);
    }
}

fn emit_achievements(
    cs: &mut ContentStream,
    doc: &ResumeDocument,
    rules: &TemplateRules,
    tier: &DisplayTier,
) {
    if doc.achievements.is_empty() {
        return;
    }
    cs.gap(tier.section_pre_gap);
    cs.line(
        LEFT_X,
        Font::Bold,
        SECTION_HEADING_SIZE,
        rules.achievements_heading,
        SECTION_HEADING_DROP,
    );

    for ach in &doc.achievements {
        if rules.split_experience_header {
            if !ach.title.trim().is_empty() {
                cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &ach.title, ENTRY_TITLE_DROP);
            }
            if !ach.issuer.trim().is_empty() {
                cs.line(LEFT_X, Font::Regular, SUB_LINE_SIZE, &ach.issuer, SUB_LINE_DROP);
            }
        } else {
            let header = join_nonempty(&[ach.title.as_str(), ach.issuer.as_str()], ", ");
            if !header.is_empty() {
                cs.line(LEFT_X, Font::Bold, ENTRY_TITLE_SIZE, &header, ENTRY_TITLE_DROP);
            }
        }

        if !ach.date.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, DATE_SIZE, ach.date.trim(), DATE_DROP);
        }
        if !ach.description.trim().is_empty() {
            cs.line(LEFT_X, Font::Regular, BODY_SIZE, &ach.description, BODY_DROP);
        }
        cs.gap(ENTRY_GAP);
    }
}

fn emit_skills(
    cs: &mut ContentStream,
    doc: &ResumeDocument,
    rules: &TemplateRules,
    tier: &DisplayTier,
) {
    let skills = doc.visible_skills();
    if skills.is_empty() {
        return;
    }
    cs.gap(tier.section_pre_gap);
    cs.line(
        LEFT_X,
        Font::Bold,
        SECTION_HEADING_SIZE,
        rules.skills_heading,
        SKILLS_HEADING_DROP,
    );
    cs.line(
        LEFT_X,
        Font::Regular,
        BODY_SIZE,
        &skills.join(rules.separator),
        BODY_DROP,
    );
}

fn join_nonempty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{
        AchievementEntry, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, Template,
    };

    fn sample_document(template: Template) -> ResumeDocument {
        ResumeDocument {
            title: "Backend Engineer Resume".to_string(),
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: "Oslo, Norway".to_string(),
                summary: "Systems engineer focused on storage and networking.".to_string(),
                ..Default::default()
            },
            education: vec![EducationEntry {
                institution: "State University".to_string(),
                degree: "BSc".to_string(),
                field: "Computer Science".to_string(),
                start_date: "2014-09".to_string(),
                end_date: "2018-06".to_string(),
                gpa: "3.8".to_string(),
                ..Default::default()
            }],
            experience: vec![ExperienceEntry {
                company: "Acme Corp".to_string(),
                position: "Software Engineer".to_string(),
                start_date: "2020-01".to_string(),
                end_date: "2023-05".to_string(),
                current: true,
                description: "Built internal tooling.".to_string(),
                ..Default::default()
            }],
            projects: vec![ProjectEntry {
                name: "Cache Server".to_string(),
                technologies: "Rust, Tokio".to_string(),
                description: "In-memory cache with TTL eviction.".to_string(),
                ..Default::default()
            }],
            achievements: vec![AchievementEntry {
                title: "Hackathon Winner".to_string(),
                issuer: "DevConf".to_string(),
                date: "2022-11".to_string(),
                ..Default::default()
            }],
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            template,
        }
    }

    fn render_string(doc: &ResumeDocument) -> String {
        String::from_utf8(MinimalPdfRenderer.render_bytes(doc)).expect("pdf text is utf-8")
    }

    #[test]
    fn test_output_is_well_formed_pdf() {
        let out = render_string(&sample_document(Template::Modern));
        assert!(out.starts_with("%PDF-1.4\n"));
        assert!(out.ends_with("%%EOF"));
        assert!(out.contains("/Type /Catalog"));
        assert!(out.contains("/BaseFont /Helvetica-Bold"));
        assert!(out.contains("/MediaBox [0 0 612 792]"));
    }

    #[test]
    fn test_xref_offsets_point_at_object_tokens() {
        let bytes = MinimalPdfRenderer.render_bytes(&sample_document(Template::Modern));
        let text = String::from_utf8(bytes.clone()).expect("utf-8");

        // startxref must point at the xref table itself
        let startxref_at = text.rfind("startxref\n").expect("startxref present");
        let xref_pos: usize = text[startxref_at + "startxref\n".len()..]
            .lines()
            .next()
            .expect("offset line")
            .parse()
            .expect("offset parses");
        assert!(bytes[xref_pos..].starts_with(b"xref\n0 7\n"));

        // each of the 6 entries must seek exactly to its "N 0 obj" token
        let entries_at = xref_pos + "xref\n0 7\n".len() + "0000000000 65535 f \n".len();
        for i in 0..6usize {
            let entry = &text[entries_at + i * 20..entries_at + i * 20 + 20];
            let offset: usize = entry[..10].parse().expect("10-digit offset");
            let token = format!("{} 0 obj", i + 1);
            assert!(
                bytes[offset..].starts_with(token.as_bytes()),
                "xref entry {} should point at '{token}', found '{}'",
                i + 1,
                &text[offset..offset + token.len().min(text.len() - offset)]
            );
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let doc = sample_document(Template::Modern);
        let first = MinimalPdfRenderer.render_bytes(&doc);
        let second = MinimalPdfRenderer.render_bytes(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_content_length_matches_stream() {
        let out = render_string(&sample_document(Template::Classic));
        let length_at = out.find("/Length ").expect("/Length present");
        let length: usize = out[length_at + "/Length ".len()..]
            .split_whitespace()
            .next()
            .expect("length value")
            .parse()
            .expect("length parses");
        let stream_start = out.find("stream\n").expect("stream present") + "stream\n".len();
        let stream_end = out.find("\nendstream").expect("endstream present");
        assert_eq!(length, stream_end - stream_start);
    }

    #[test]
    fn test_current_role_renders_present() {
        let out = render_string(&sample_document(Template::Modern));
        assert!(out.contains("(2020-01 - Present) Tj"));
        assert!(!out.contains("2023-05"), "stored end date must be ignored");
    }

    #[test]
    fn test_empty_sections_emit_no_headers() {
        let doc = ResumeDocument {
            title: "Sparse".to_string(),
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                summary: "Short summary.".to_string(),
                ..Default::default()
            },
            skills: vec!["   ".to_string()],
            ..Default::default()
        };
        let out = render_string(&doc);
        assert!(out.contains("(Jane Doe)"));
        assert!(out.contains("(PROFESSIONAL SUMMARY)"));
        for header in ["WORK EXPERIENCE", "EDUCATION", "PROJECTS", "ACHIEVEMENTS", "SKILLS"] {
            assert!(!out.contains(header), "unexpected section header {header}");
        }
    }

    #[test]
    fn test_contact_line_omitted_without_email_and_phone() {
        let doc = ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                address: "Oslo".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = render_string(&doc);
        assert!(out.contains("(Oslo)"));
        assert!(!out.contains(" \u{2022} "));
        assert!(!out.contains(" | "));
    }

    #[test]
    fn test_templates_diverge_in_heading_and_separator() {
        let modern = render_string(&sample_document(Template::Modern));
        let classic = render_string(&sample_document(Template::Classic));

        assert!(modern.contains("(PROFESSIONAL SUMMARY)"));
        assert!(!modern.contains("(OBJECTIVE)"));
        assert!(classic.contains("(OBJECTIVE)"));
        assert!(!classic.contains("(PROFESSIONAL SUMMARY)"));

        assert!(modern.contains("Rust \u{2022} PostgreSQL"));
        assert!(classic.contains("Rust | PostgreSQL"));

        // experience header composition: split vs combined
        assert!(modern.contains("(Software Engineer) Tj"));
        assert!(classic.contains("(Software Engineer, Acme Corp) Tj"));
    }

    #[test]
    fn test_text_escaping() {
        let mut doc = sample_document(Template::Modern);
        doc.experience[0].description = "Built (A) & B\\C\nnext line".to_string();
        let out = render_string(&doc);
        assert!(out.contains("(Built \\(A\\) & B\\\\C\\nnext line) Tj"));
        assert!(!out.contains("(Built (A)"));
    }

    #[test]
    fn test_carriage_returns_stripped() {
        assert_eq!(escape_pdf_text("a\r\nb"), "a\\nb");
        assert_eq!(escape_pdf_text("plain"), "plain");
    }

    #[test]
    fn test_education_gpa_appended_to_dates() {
        let out = render_string(&sample_document(Template::Classic));
        assert!(out.contains("(2014-09 - 2018-06 | GPA: 3.8) Tj"));
    }
}
