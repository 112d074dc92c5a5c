//! Classic template: single-column flow under a full-width banner.
//!
//! Layout, top to bottom: banner (name, title line, contact line), age line
//! aligned right, then one section per populated collection in the order
//! given by [`SECTIONS`]. Multi-entry sections emit a separator after every
//! entry, the last one included.

use crate::document::{
    style_for, Alignment, ColorRole, DocumentModel, FontToken, Paragraph, ParagraphStyle,
    RunStyle, Section, SectionKind, SizeScale, TemplateStyle,
};
use crate::models::ResumeData;
use crate::templates::common::{self, labels};
use crate::templates::{SectionBuilder, Template};

/// Body sections in display order.
pub const SECTIONS: &[(SectionKind, SectionBuilder)] = &[
    (SectionKind::Profile, profile),
    (SectionKind::Experience, experience),
    (SectionKind::Education, education),
    (SectionKind::Skills, skills),
    (SectionKind::Languages, languages),
    (SectionKind::Certifications, certifications),
    (SectionKind::References, references),
    (SectionKind::Projects, projects),
];

pub fn build(data: &ResumeData) -> DocumentModel {
    let style = style_for(Template::Classic);
    let mut sections = vec![identity(data, style)];
    sections.extend(SECTIONS.iter().filter_map(|(_, build)| build(data, style)));
    DocumentModel {
        template: Template::Classic,
        sections,
    }
}

fn heading(label: &str, style: &TemplateStyle) -> Paragraph {
    Paragraph::text(
        label,
        RunStyle::body()
            .bold()
            .size(SizeScale::Heading)
            .color(ColorRole::Primary)
            .font(FontToken::Heading),
        ParagraphStyle::default()
            .spacing(style.space(4), style.space(2))
            .bottom_rule(ColorRole::Primary),
    )
}

/// Wraps entries, appending a separator after each one.
fn entries_section<T>(
    kind: SectionKind,
    label: &str,
    entries: &[T],
    render: fn(&T, &TemplateStyle) -> Vec<Paragraph>,
    style: &TemplateStyle,
) -> Option<Section> {
    let rendered: Vec<Vec<Paragraph>> = entries
        .iter()
        .map(|e| render(e, style))
        .filter(|paras| !paras.is_empty())
        .collect();
    if rendered.is_empty() {
        return None;
    }
    let mut section = Section::with_heading(kind, heading(label, style));
    for entry in rendered {
        section.extend(entry);
        section.push(common::separator(style));
    }
    Some(section)
}

// ────────────────────────────────────────────────────────────────────────────
// Identity banner
// ────────────────────────────────────────────────────────────────────────────

fn identity(data: &ResumeData, style: &TemplateStyle) -> Section {
    let banner = ParagraphStyle::default()
        .align(Alignment::Center)
        .background(ColorRole::Banner);
    let mut section = Section::new(SectionKind::Identity);

    let name = data.full_name();
    if !name.is_empty() {
        section.push(Paragraph::text(
            name,
            RunStyle::body()
                .bold()
                .size(SizeScale::Display)
                .color(ColorRole::Inverse)
                .font(FontToken::Heading),
            banner.spacing(0, style.space(1)),
        ));
    }

    if let Some(line) = common::title_line(data, style) {
        section.push(Paragraph::text(
            line,
            RunStyle::body()
                .size(SizeScale::Title)
                .color(ColorRole::Inverse),
            banner.spacing(0, style.space(1)),
        ));
    }

    let contact = data.contact_fields();
    if !contact.is_empty() {
        section.push(Paragraph::text(
            contact.join(style.separator),
            RunStyle::body()
                .size(SizeScale::Small)
                .color(ColorRole::Inverse),
            banner.spacing(0, style.space(2)),
        ));
    }

    if let Some(age) = common::age_line(data) {
        section.push(Paragraph::text(
            age,
            RunStyle::body().size(SizeScale::Small).color(ColorRole::Muted),
            ParagraphStyle::default()
                .align(Alignment::Right)
                .spacing(style.space(1), 0),
        ));
    }

    section
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn profile(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let paragraphs = common::description(&data.summary, style);
    if paragraphs.is_empty() {
        return None;
    }
    let mut section = Section::with_heading(SectionKind::Profile, heading(labels::PROFILE, style));
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

fn skills(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let names = common::skill_names(&data.skills);
    if names.is_empty() {
        return None;
    }
    let mut section = Section::with_heading(SectionKind::Skills, heading(labels::SKILLS, style));
    section.push(Paragraph::text(
        names.join(style.separator),
        RunStyle::body(),
        ParagraphStyle::default().spacing(0, style.space(1)),
    ));
    Some(section)
}

fn languages(data: &ResumeData, style: &TemplateStyle) -> Option<Section> {
    let languages = common::named_languages(&data.languages);
    if languages.is_empty() {
        return None;
    }
    let mut section =
        Section::with_heading(SectionKind::Languages, heading(labels::LANGUAGES, style));
    for (name, level) in languages {
        let mut p = Paragraph::new(ParagraphStyle::default().spacing(0, style.space(1)))
            .with(name, RunStyle::body().bold());
        if let Some(level) = level {
            p.push(": ", RunStyle::body());
            p.push(level, RunStyle::body().color(ColorRole::Muted));
        }
        section.push(p);
    }
    Some(section)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Certification, Education, Experience, Language, Reference, Skill};

    fn identity_only() -> ResumeData {
        ResumeData {
            name: Some("Ana".to_string()),
            surname: Some("Ruiz".to_string()),
            title: Some("Backend Developer".to_string()),
            field_of_study: Some("Informática".to_string()),
            phone: Some("600 000 000".to_string()),
            website: Some("ana.dev".to_string()),
            age: Some(29),
            ..Default::default()
        }
    }

    fn full() -> ResumeData {
        ResumeData {
            summary: Some("Ingeniera backend. Rust y Go.".to_string()),
            experiences: vec![
                Experience {
                    role: Some("Dev".to_string()),
                    organization: Some("Acme".to_string()),
                    ..Default::default()
                },
                Experience {
                    role: Some("Lead".to_string()),
                    organization: Some("Initech".to_string()),
                    ..Default::default()
                },
            ],
            education: vec![Education {
                credential: Some("Grado".to_string()),
                institution: Some("UPM".to_string()),
                ..Default::default()
            }],
            skills: vec![
                Skill {
                    name: "Rust".to_string(),
                },
                Skill {
                    name: "SQL".to_string(),
                },
            ],
            languages: vec![
                Language {
                    name: "Inglés".to_string(),
                    level: Some("C1".to_string()),
                },
                Language {
                    name: "Francés".to_string(),
                    level: None,
                },
            ],
            certifications: vec![Certification {
                name: Some("CKA".to_string()),
                ..Default::default()
            }],
            references: vec![Reference {
                name: Some("Luis".to_string()),
                ..Default::default()
            }],
            projects: vec![crate::models::resume::Project {
                name: Some("cvgen".to_string()),
                ..Default::default()
            }],
            ..identity_only()
        }
    }

    #[test]
    fn test_section_order_is_fixed() {
        let kinds: Vec<SectionKind> = SECTIONS.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Profile,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
                SectionKind::Languages,
                SectionKind::Certifications,
                SectionKind::References,
                SectionKind::Projects,
            ]
        );
        let doc = build(&full());
        let mut expected = vec![SectionKind::Identity];
        expected.extend(kinds);
        assert_eq!(doc.section_kinds(), expected);
    }

    #[test]
    fn test_banner_lines() {
        let doc = build(&identity_only());
        let identity: Vec<_> = doc.sections[0].paragraphs().collect();
        assert_eq!(identity.len(), 4);
        assert_eq!(identity[0].plain_text(), "Ana Ruiz");
        assert_eq!(identity[1].plain_text(), "Informática | Backend Developer");
        assert_eq!(identity[2].plain_text(), "600 000 000 | ana.dev");
        assert!(identity[..3]
            .iter()
            .all(|p| p.style.background == Some(ColorRole::Banner)));
        assert_eq!(identity[3].plain_text(), "29 años");
        assert_eq!(identity[3].style.alignment, Alignment::Right);
    }

    #[test]
    fn test_missing_contact_drops_line_without_padding() {
        let data = ResumeData {
            phone: None,
            website: None,
            age: None,
            ..identity_only()
        };
        let doc = build(&data);
        let texts: Vec<String> = doc.sections[0].paragraphs().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Ana Ruiz", "Informática | Backend Developer"]);
    }

    #[test]
    fn test_separator_after_every_entry_including_last() {
        let doc = build(&full());
        let experience = doc.sections_of(SectionKind::Experience)[0];
        let separators = experience.paragraphs().filter(|p| p.is_separator()).count();
        assert_eq!(separators, 2);
        assert!(experience
            .paragraphs()
            .last()
            .is_some_and(Paragraph::is_separator));
    }

    #[test]
    fn test_languages_with_and_without_level() {
        let doc = build(&full());
        let section = doc.sections_of(SectionKind::Languages)[0];
        let texts: Vec<String> = section.paragraphs().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Inglés: C1", "Francés"]);
    }

    #[test]
    fn test_skills_joined_in_one_paragraph() {
        let doc = build(&full());
        let section = doc.sections_of(SectionKind::Skills)[0];
        let texts: Vec<String> = section.paragraphs().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Rust | SQL"]);
    }

    #[test]
    fn test_blank_entries_produce_no_section() {
        let data = ResumeData {
            experiences: vec![Experience::default()],
            references: vec![Reference::default()],
            skills: vec![Skill {
                name: "  ".to_string(),
            }],
            ..identity_only()
        };
        let doc = build(&data);
        assert!(doc.headings().is_empty());
    }

    #[test]
    fn test_profile_uses_segmenter() {
        let doc = build(&full());
        let profile = doc.sections_of(SectionKind::Profile)[0];
        let texts: Vec<String> = profile.paragraphs().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Ingeniera backend.", "Rust y Go."]);
        assert_eq!(
            profile.heading.as_ref().map(Paragraph::plain_text).as_deref(),
            Some(labels::PROFILE)
        );
    }
}
