//! Modern template: a two-column table region.
//!
//! Sidebar (first column): initials glyph, contact lines, skills, languages.
//! Main column: name, age, title line, then the remaining sections in the
//! order given by [`MAIN_SECTIONS`]. Column widths come from the catalog.

use crate::document::{
    style_for, Alignment, Block, ColorRole, ColumnSpec, DocumentModel, FontToken, Paragraph,
    ParagraphStyle, RunStyle, Section, SectionKind, SizeScale, TableCell, TableRegion, TableRow,
    TemplateStyle,
};
use crate::models::ResumeData;
use crate::templates::common::{self, labels};
use crate::templates::{SectionBuilder, Template};

/// Placeholder shown in the glyph when there are no initials.
const GLYPH_PLACEHOLDER: &str = "CV";

/// Sidebar sections, top to bottom.
pub const SIDEBAR_SECTIONS: &[(SectionKind, SectionBuilder)] = &[
    (SectionKind::Contact, contact),
    (SectionKind::Skills, skills),
    (SectionKind::Languages, languages),
];

/// Main column sections after the identity header.
pub const MAIN_SECTIONS: &[(SectionKind, SectionBuilder)] = &[
    (SectionKind::Profile, profile),
    (SectionKind::Experience, experience),
    (SectionKind::Education, education),
    (SectionKind::Certifications, certifications),
    (SectionKind::References, references),
    (SectionKind::Projects, projects),
];

pub fn build(data: &ResumeData) -> DocumentModel {
    let style = style_for(Template::Modern);

    let mut sidebar = vec![glyph(data, style)];
    sidebar.extend(SIDEBAR_SECTIONS.iter().filter_map(|(_, build)| build(data, style)));

    let mut main = vec![identity(data, style)];
    main.extend(MAIN_SECTIONS.iter().filter_map(|(_, build)| build(data, style)));

    let table = TableRegion {
        columns: vec![
            ColumnSpec {
                width_pct: style.sidebar_width_pct,
                background: Some(ColorRole::Sidebar),
            },
            ColumnSpec {
                width_pct: 100 - style.sidebar_width_pct,
                background: None,
            },
        ],
        rows: vec![TableRow {
            cells: vec![TableCell { sections: sidebar }, TableCell { sections: main }],
        }],
    };

    let mut layout = Section::new(SectionKind::Layout);
    layout.blocks.push(Block::Table(table));
    DocumentModel {
        template: Template::Modern,
        sections: vec![layout],
    }
}

fn main_heading(label: &str, style: &TemplateStyle) -> Paragraph {
    Paragraph::text(
        label.to_uppercase(),
        RunStyle::body()
            .bold()
            .size(SizeScale::Heading)
            .color(ColorRole::Primary)
            .font(FontToken::Heading),
        ParagraphStyle::default()
            .spacing(style.space(4), style.space(1))
            .bottom_rule(ColorRole::Accent),
    )
}

fn sidebar_heading(label: &str, style: &TemplateStyle) -> Paragraph {
    Paragraph::text(
        label,
        RunStyle::body()
            .bold()
            .size(SizeScale::Title)
            .color(ColorRole::Primary)
            .font(FontToken::Heading),
        ParagraphStyle::default().spacing(style.space(4), style.space(1)),
    )
}

fn line(text: impl Into<String>, run: RunStyle, style: &TemplateStyle) -> Paragraph {
    Paragraph::text(text, run, ParagraphStyle::default().spacing(0, style.space(1)))
}

/// Entries separated by vertical space instead of rules.
fn entries_section<T>(
    kind: SectionKind,
    label: &str,
    entries: &[T],
    render: fn(&T, &TemplateStyle) -> Vec<Paragraph>,
    style: &TemplateStyle,
) -> Option<Section> {
    let mut section = Section::with_heading(kind, main_heading(label, style));
    for entry in entries {
        let mut paragraphs = render(entry, style);
        if let Some(last) = paragraphs.last_mut() {
            last.style.spacing_after = last.style.spacing_after.max(style.space(2));
        }
        section.extend(paragraphs);
    }
    (!section.blocks.is_empty()).then_some(section)
}

// ────────────────────────────────────────────────────────────────────────────
// Sidebar
// ────────────────────────────────────────────────────────────────────────────

fn glyph(data: &ResumeData, style: &TemplateStyle) -> Section {
    let initials = data.initials();
    let label = if initials.is_empty() {
        GLYPH_PLACEHOLDER.to_string()
    } else {
        initials
    };
    let mut section = Section::new(SectionKind::Glyph);
    section.push(Paragraph::text(
        label,
        RunStyle::body()
            .bold()
            .size(SizeScale::Display)
            .color(ColorRole::Inverse)
            .font(FontToken::Heading),
        ParagraphStyle::default()
            .align(Alignment::Center)
            .background(ColorRole::Banner)
            .spacing(style.space(2), style.space(2)),
    ));
    section
}

fn contact(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let fields = data.contact_fields();
    if fields.is_empty() {
        return None;
    }
    let mut section =
        Section::with_heading(SectionKind::Contact, sidebar_heading(labels::CONTACT, style));
    for field in fields {
        section.push(line(field, RunStyle::body().size(SizeScale::Small), style));
    }
    Some(section)
}

fn skills(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let names = common::skill_names(&data.skills);
    if names.is_empty() {
        return None;
    }
    let mut section =
        Section::with_heading(SectionKind::Skills, sidebar_heading(labels::SKILLS, style));
    section.push(line(
        names.join(style.separator),
        RunStyle::body().size(SizeScale::Small),
        style,
    ));
    Some(section)
}

fn languages(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let languages = common::named_languages(&data.languages);
    if languages.is_empty() {
        return None;
    }
    let mut section =
        Section::with_heading(SectionKind::Languages, sidebar_heading(labels::LANGUAGES, style));
    for (name, level) in languages {
        let text = match level {
            Some(level) => format!("{name} ({level})"),
            None => name.to_string(),
        };
        section.push(line(text, RunStyle::body().size(SizeScale::Small), style));
    }
    Some(section)
}

// ────────────────────────────────────────────────────────────────────────────
// Main column
// ────────────────────────────────────────────────────────────────────────────

fn identity(data: &ResumeData, style: &TemplateStyle) -> Section {
    let mut section = Section::new(SectionKind::Identity);

    let name = data.full_name();
    if !name.is_empty() {
        section.push(Paragraph::text(
            name,
            RunStyle::body()
                .bold()
                .size(SizeScale::Display)
                .color(ColorRole::Primary)
                .font(FontToken::Heading),
            ParagraphStyle::default().spacing(style.space(2), 0),
        ));
    }
    if let Some(age) = common::age_line(data) {
        section.push(line(
            age,
            RunStyle::body().size(SizeScale::Small).color(ColorRole::Muted),
            style,
        ));
    }
    if let Some(title) = common::title_line(data, style) {
        section.push(line(
            title,
            RunStyle::body()
                .size(SizeScale::Title)
                .color(ColorRole::Accent),
            style,
        ));
    }
    section
}

fn profile(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let paragraphs = common::description(&data.summary, style);
    if paragraphs.is_empty() {
        return None;
    }
    let mut section =
        Section::with_heading(SectionKind::Profile, main_heading(labels::PROFILE, style));
    section.extend(paragraphs);
    Some(section)
}

fn experience(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    entries_section(
        SectionKind::Experience,
        labels::EXPERIENCE,
        &data.experiences,
        common::experience_entry,
        style,
    )
}

fn education(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    entries_section(
        SectionKind::Education,
        labels::EDUCATION,
        &data.education,
        common::education_entry,
        style,
    )
}

fn certifications(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    entries_section(
        SectionKind::Certifications,
        labels::CERTIFICATIONS,
        &data.certifications,
        common::certification_entry,
        style,
    )
}

fn references(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let identified: Vec<_> = data.identified_references().into_iter().cloned().collect();
    entries_section(
        SectionKind::References,
        labels::REFERENCES,
        &identified,
        common::reference_entry,
        style,
    )
}

fn projects(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    entries_section(
        SectionKind::Projects,
        labels::PROJECTS,
        &data.projects,
        common::project_entry,
        style,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
