//! Entry renderers shared by both templates.
//!
//! Each renderer emits only the sub-fields that are present; a missing field
//! drops its run or line instead of leaving a gap.

use crate::document::{
    segment_paragraphs, ColorRole, FontToken, Paragraph, ParagraphStyle, RunStyle,
    SegmentSpacing, SizeScale, TemplateStyle,
};
use crate::models::resume::{
    text, Certification, Education, Experience, Language, Project, Reference, ResumeData, Skill,
};

/// Display labels for headings and inline captions.
pub mod labels {
    pub const PROFILE: &str = "Perfil profesional";
    pub const EXPERIENCE: &str = "Experiencia";
    pub const EDUCATION: &str = "Educación";
    pub const SKILLS: &str = "Aptitudes";
    pub const LANGUAGES: &str = "Idiomas";
    pub const CERTIFICATIONS: &str = "Certificaciones";
    pub const REFERENCES: &str = "Referencias";
    pub const PROJECTS: &str = "Proyectos";
    pub const CONTACT: &str = "Contacto";
    pub const TECHNOLOGIES: &str = "Tecnologías: ";
    pub const AGE_SUFFIX: &str = " años";
}

const PERIOD_SEPARATOR: &str = " - ";

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

/// Joins the present parts with `sep`; `None` when nothing is present.
pub fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.into_iter().flatten().collect();
    (!present.is_empty()).then(|| present.join(sep))
}

/// "start - end", or whichever end of the period exists.
pub fn period(start: &Option<String>, end: &Option<String>) -> Option<String> {
    join_present([text(start), text(end)], PERIOD_SEPARATOR)
}

/// "field of study | title" line.
pub fn title_line(data: &ResumeData, style: &TemplateStyle) -> Option<String> {
    join_present([text(&data.field_of_study), text(&data.title)], style.separator)
}

pub fn age_line(data: &ResumeData) -> Option<String> {
    data.age.map(|age| format!("{age}{}", labels::AGE_SUFFIX))
}

pub fn skill_names(skills: &[Skill]) -> Vec<&str> {
    skills
        .iter()
        .map(|s| s.name.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn named_languages(languages: &[Language]) -> Vec<(&str, Option<&str>)> {
    languages
        .iter()
        .filter(|l| !l.name.trim().is_empty())
        .map(|l| (l.name.trim(), text(&l.level)))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Paragraph helpers
// ────────────────────────────────────────────────────────────────────────────

/// Free text split into display paragraphs with the template's spacing.
pub fn description(value: &Option<String>, style: &TemplateStyle) -> Vec<Paragraph> {
    match text(value) {
        Some(body) => segment_paragraphs(
            body,
            RunStyle::body(),
            SegmentSpacing {
                before: 0,
                after: style.segment_spacing,
            },
        ),
        None => Vec::new(),
    }
}

/// Visual separator emitted after each entry of a multi-entry section.
pub fn separator(style: &TemplateStyle) -> Paragraph {
    Paragraph::new(
        ParagraphStyle::default()
            .spacing(0, style.space(2))
            .bottom_rule(ColorRole::Rule),
    )
}

fn entry_title(primary: Option<&str>, secondary: Option<&str>, style: &TemplateStyle) -> Option<Paragraph> {
    if primary.is_none() && secondary.is_none() {
        return None;
    }
    let mut p = Paragraph::new(ParagraphStyle::default().spacing(style.space(1), 0));
    if let Some(primary) = primary {
        p.push(
            primary,
            RunStyle::body()
                .bold()
                .color(ColorRole::Primary)
                .font(FontToken::Heading),
        );
    }
    if let Some(secondary) = secondary {
        if primary.is_some() {
            p.push(style.separator, RunStyle::body().color(ColorRole::Muted));
        }
        p.push(secondary, RunStyle::body().color(ColorRole::Accent));
    }
    Some(p)
}

fn meta_line(value: Option<String>, style: &TemplateStyle) -> Option<Paragraph> {
    value.map(|line| {
        Paragraph::text(
            line,
            RunStyle::body()
                .italic()
                .size(SizeScale::Small)
                .color(ColorRole::Muted),
            ParagraphStyle::default().spacing(0, style.space(1)),
        )
    })
}

fn link_line(url: &Option<String>, style: &TemplateStyle) -> Option<Paragraph> {
    text(url).map(|url| {
        Paragraph::text(
            url,
            RunStyle::body()
                .underline()
                .size(SizeScale::Small)
                .color(ColorRole::Accent),
            ParagraphStyle::default().spacing(0, style.space(1)),
        )
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Entry renderers
// ────────────────────────────────────────────────────────────────────────────

pub fn experience_entry(exp: &Experience, style: &TemplateStyle) -> Vec<Paragraph> {
    let mut out = Vec::new();
    out.extend(entry_title(text(&exp.role), text(&exp.organization), style));
    let meta = join_present(
        [
            period(&exp.start_date, &exp.end_date).as_deref(),
            text(&exp.location),
        ],
        style.separator,
    );
    out.extend(meta_line(meta, style));
    out.extend(description(&exp.description, style));
    out
}

pub fn education_entry(edu: &Education, style: &TemplateStyle) -> Vec<Paragraph> {
    let mut out = Vec::new();
    out.extend(entry_title(text(&edu.credential), text(&edu.institution), style));
    let meta = join_present(
        [
            period(&edu.start_date, &edu.end_date).as_deref(),
            text(&edu.location),
        ],
        style.separator,
    );
    out.extend(meta_line(meta, style));
    out.extend(description(&edu.description, style));
    out
}

pub fn certification_entry(cert: &Certification, style: &TemplateStyle) -> Vec<Paragraph> {
    let mut out = Vec::new();
    out.extend(entry_title(text(&cert.name), None, style));
    out.extend(meta_line(
        join_present([text(&cert.issuer), text(&cert.date)], style.separator),
        style,
    ));
    out.extend(link_line(&cert.url, style));
    out
}

pub fn project_entry(project: &Project, style: &TemplateStyle) -> Vec<Paragraph> {
    let mut out = Vec::new();
    out.extend(entry_title(text(&project.name), None, style));
    out.extend(description(&project.description, style));

    let technologies: Vec<&str> = project
        .technologies
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !technologies.is_empty() {
        out.push(
            Paragraph::new(ParagraphStyle::default().spacing(0, style.space(1)))
                .with(labels::TECHNOLOGIES, RunStyle::body().bold().size(SizeScale::Small))
                .with(technologies.join(", "), RunStyle::body().size(SizeScale::Small)),
        );
    }
    out.extend(link_line(&project.url, style));
    out
}

pub fn reference_entry(reference: &Reference, style: &TemplateStyle) -> Vec<Paragraph> {
    let mut out = Vec::new();
    out.extend(entry_title(text(&reference.name), None, style));
    out.extend(meta_line(
        join_present(
            [text(&reference.role), text(&reference.organization)],
            style.separator,
        ),
        style,
    ));
    out.extend(meta_line(
        join_present([text(&reference.phone), text(&reference.email)], style.separator),
        style,
    ));
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
