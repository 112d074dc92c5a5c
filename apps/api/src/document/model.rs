//! Hierarchical document object model: sections → blocks → styled runs.
//!
//! Every style field is explicit and has a documented default, so a builder
//! cannot silently drop style intent by omitting a key.

use serde::{Deserialize, Serialize};

use crate::templates::Template;

// ────────────────────────────────────────────────────────────────────────────
// Style vocabulary
// ────────────────────────────────────────────────────────────────────────────

/// Symbolic color, resolved to a concrete color by the template's palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Regular body text.
    Text,
    /// Secondary text: dates, locations, captions.
    Muted,
    /// Names and section headings.
    Primary,
    /// Links and highlights.
    Accent,
    /// Text drawn on top of a dark background.
    Inverse,
    /// Background of the Classic header banner.
    Banner,
    /// Background of the Modern sidebar column.
    Sidebar,
    /// Horizontal rules and entry separators.
    Rule,
}

/// Typographic scale step, resolved to points by the template's type scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeScale {
    Display,
    Title,
    Heading,
    Body,
    Small,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontToken {
    Heading,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Character-level style of a run.
///
/// Defaults: `Text` color, `Body` size, `Body` font, no bold/italic/underline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunStyle {
    pub color: ColorRole,
    pub size: SizeScale,
    pub font: FontToken,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self::body()
    }
}

impl RunStyle {
    pub const fn body() -> Self {
        Self {
            color: ColorRole::Text,
            size: SizeScale::Body,
            font: FontToken::Body,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub const fn color(mut self, color: ColorRole) -> Self {
        self.color = color;
        self
    }

    pub const fn size(mut self, size: SizeScale) -> Self {
        self.size = size;
        self
    }

    pub const fn font(mut self, font: FontToken) -> Self {
        self.font = font;
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Block-level style of a paragraph.
///
/// Defaults: left aligned, no spacing, no background, no bottom rule.
/// Spacing is in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParagraphStyle {
    pub alignment: Alignment,
    pub spacing_before: u16,
    pub spacing_after: u16,
    /// Fill behind the whole paragraph (banner lines).
    pub background: Option<ColorRole>,
    /// Rule drawn under the paragraph (entry separators, heading underlines).
    pub bottom_rule: Option<ColorRole>,
}

impl ParagraphStyle {
    pub const fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub const fn spacing(mut self, before: u16, after: u16) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }

    pub const fn background(mut self, role: ColorRole) -> Self {
        self.background = Some(role);
        self
    }

    pub const fn bottom_rule(mut self, role: ColorRole) -> Self {
        self.bottom_rule = Some(role);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<StyledRun>,
    pub style: ParagraphStyle,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            runs: Vec::new(),
            style,
        }
    }

    /// Paragraph holding a single run.
    pub fn text(text: impl Into<String>, run: RunStyle, style: ParagraphStyle) -> Self {
        Self {
            runs: vec![StyledRun::new(text, run)],
            style,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, style: RunStyle) {
        self.runs.push(StyledRun::new(text, style));
    }

    pub fn with(mut self, text: impl Into<String>, style: RunStyle) -> Self {
        self.push(text, style);
        self
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// A run-less paragraph that only draws its bottom rule.
    pub fn is_separator(&self) -> bool {
        self.runs.is_empty() && self.style.bottom_rule.is_some()
    }
}

/// Column of a table region; widths are percentages of the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub width_pct: u8,
    pub background: Option<ColorRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableCell {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// Fixed row/column structure; only the two-column layout uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegion {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(TableRegion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Name, title, contact and age lines.
    Identity,
    /// Initials glyph at the top of the sidebar.
    Glyph,
    Contact,
    Profile,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    References,
    Projects,
    /// Wrapper around a table region.
    Layout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: Option<Paragraph>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            heading: None,
            blocks: Vec::new(),
        }
    }

    pub fn with_heading(kind: SectionKind, heading: Paragraph) -> Self {
        Self {
            kind,
            heading: Some(heading),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    pub fn extend(&mut self, paragraphs: impl IntoIterator<Item = Paragraph>) {
        self.blocks
            .extend(paragraphs.into_iter().map(Block::Paragraph));
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub template: Template,
    pub sections: Vec<Section>,
}

impl DocumentModel {
    /// Every section in reading order, descending into table cells
    /// row by row, cell by cell.
    pub fn all_sections(&self) -> Vec<&Section> {
        fn walk<'a>(sections: &'a [Section], out: &mut Vec<&'a Section>) {
            for section in sections {
                out.push(section);
                for block in &section.blocks {
                    if let Block::Table(table) = block {
                        for row in &table.rows {
                            for cell in &row.cells {
                                walk(&cell.sections, out);
                            }
                        }
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.sections, &mut out);
        out
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.all_sections().iter().map(|s| s.kind).collect()
    }

    pub fn sections_of(&self, kind: SectionKind) -> Vec<&Section> {
        self.all_sections()
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect()
    }

    /// Heading texts in reading order.
    pub fn headings(&self) -> Vec<String> {
        self.all_sections()
            .iter()
            .filter_map(|s| s.heading.as_ref().map(Paragraph::plain_text))
            .collect()
    }

    /// Text of every heading and paragraph, one line each.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for section in self.all_sections() {
            if let Some(heading) = &section.heading {
                lines.push(heading.plain_text());
            }
            for p in section.paragraphs() {
                if !p.runs.is_empty() {
                    lines.push(p.plain_text());
                }
            }
        }
        lines.join("\n")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_style_defaults() {
        let style = RunStyle::default();
        assert_eq!(style.color, ColorRole::Text);
        assert_eq!(style.size, SizeScale::Body);
        assert_eq!(style.font, FontToken::Body);
        assert!(!style.bold && !style.italic && !style.underline);
    }

    #[test]
    fn test_paragraph_style_defaults() {
        let style = ParagraphStyle::default();
        assert_eq!(style.alignment, Alignment::Left);
        assert_eq!((style.spacing_before, style.spacing_after), (0, 0));
        assert!(style.background.is_none());
        assert!(style.bottom_rule.is_none());
    }

    #[test]
    fn test_separator_detection() {
        let rule = Paragraph::new(ParagraphStyle::default().bottom_rule(ColorRole::Rule));
        assert!(rule.is_separator());
        let text = Paragraph::text("x", RunStyle::body(), ParagraphStyle::default());
        assert!(!text.is_separator());
    }

    #[test]
    fn test_all_sections_descends_into_tables() {
        let mut left = Section::new(SectionKind::Contact);
        left.push(Paragraph::text("a", RunStyle::body(), ParagraphStyle::default()));
        let right = Section::new(SectionKind::Experience);
        let table = TableRegion {
            columns: vec![],
            rows: vec![TableRow {
                cells: vec![
                    TableCell {
                        sections: vec![left],
                    },
                    TableCell {
                        sections: vec![right],
                    },
                ],
            }],
        };
        let mut layout = Section::new(SectionKind::Layout);
        layout.blocks.push(Block::Table(table));
        let doc = DocumentModel {
            template: Template::Modern,
            sections: vec![layout],
        };
        assert_eq!(
            doc.section_kinds(),
            vec![
                SectionKind::Layout,
                SectionKind::Contact,
                SectionKind::Experience
            ]
        );
        assert_eq!(doc.plain_text(), "a");
    }
}
