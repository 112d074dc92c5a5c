//! PDF writer on top of `lopdf`.
//!
//! Letter pages, base-14 fonts with WinAnsi encoding, greedy word wrap from
//! the static width tables. Two layers per page: backgrounds (column fills)
//! are painted first, then content (paragraph fills, text, rules). Table
//! columns flow independently and may break onto new pages on their own.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::document::style::{rgb, PdfBaseFont};
use crate::document::{
    style_for, Alignment, Block, ColorRole, DocumentModel, Paragraph, RunStyle, Section,
    SectionKind, TableRegion, TemplateStyle,
};
use crate::render::metrics::get_metrics;
use crate::render::GenerationError;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 42.0;
const LINE_HEIGHT_FACTOR: f32 = 1.25;
/// Inner padding of table cells.
const CELL_PADDING: f32 = 10.0;
/// Horizontal bleed of paragraph backgrounds past the text frame.
const FILL_BLEED: f32 = 6.0;
/// Guard against metric approximation at the right edge.
const RIGHT_SLACK: f32 = 2.0;
const RULE_WIDTH: f32 = 0.75;
const RULE_GAP: f32 = 3.0;

/// Resource name → base font, in resource order.
const FONTS: &[(&str, &str)] = &[
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Helvetica-Oblique"),
    ("F4", "Helvetica-BoldOblique"),
    ("F5", "Times-Roman"),
    ("F6", "Times-Bold"),
    ("F7", "Times-Italic"),
    ("F8", "Times-BoldItalic"),
];

fn font_key(base: PdfBaseFont, bold: bool, italic: bool) -> &'static str {
    match (base, bold, italic) {
        (PdfBaseFont::Helvetica, false, false) => "F1",
        (PdfBaseFont::Helvetica, true, false) => "F2",
        (PdfBaseFont::Helvetica, false, true) => "F3",
        (PdfBaseFont::Helvetica, true, true) => "F4",
        (PdfBaseFont::Times, false, false) => "F5",
        (PdfBaseFont::Times, true, false) => "F6",
        (PdfBaseFont::Times, false, true) => "F7",
        (PdfBaseFont::Times, true, true) => "F8",
    }
}

/// Encodes text for a WinAnsi-encoded base font. Unmappable characters
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Layout primitives
// ────────────────────────────────────────────────────────────────────────────

/// Horizontal band text is laid out in.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    width: f32,
}

/// Position of the next line's top edge, in PDF coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    page: usize,
    y: f32,
}

impl Cursor {
    fn top(page: usize) -> Self {
        Self {
            page,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Whichever of the two ends further down the document.
    fn furthest(self, other: Cursor) -> Cursor {
        if other.page > self.page || (other.page == self.page && other.y < self.y) {
            other
        } else {
            self
        }
    }
}

#[derive(Default)]
struct Canvas {
    backgrounds: Vec<Vec<Operation>>,
    content: Vec<Vec<Operation>>,
}

impl Canvas {
    fn ensure_page(&mut self, page: usize) {
        while self.content.len() <= page {
            self.content.push(Vec::new());
            self.backgrounds.push(Vec::new());
        }
    }

    fn content(&mut self, page: usize) -> &mut Vec<Operation> {
        self.ensure_page(page);
        &mut self.content[page]
    }

    fn background(&mut self, page: usize) -> &mut Vec<Operation> {
        self.ensure_page(page);
        &mut self.backgrounds[page]
    }
}

fn fill_rect(ops: &mut Vec<Operation>, hex: &str, x: f32, y: f32, w: f32, h: f32) {
    let (r, g, b) = rgb(hex);
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
    ops.push(Operation::new("f", vec![]));
}

fn stroke_line(ops: &mut Vec<Operation>, hex: &str, width: f32, x1: f32, x2: f32, y: f32) {
    let (r, g, b) = rgb(hex);
    ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
    ops.push(Operation::new("w", vec![width.into()]));
    ops.push(Operation::new("m", vec![x1.into(), y.into()]));
    ops.push(Operation::new("l", vec![x2.into(), y.into()]));
    ops.push(Operation::new("S", vec![]));
}

// ────────────────────────────────────────────────────────────────────────────
// Line breaking
// ────────────────────────────────────────────────────────────────────────────

enum Token<'a> {
    Word {
        text: String,
        style: &'a RunStyle,
        space_before: bool,
    },
    Break,
}

/// Splits runs into words, remembering whether whitespace preceded each one
/// (also across run boundaries). `\n` forces a line break.
fn tokenize(paragraph: &Paragraph) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pending_space = false;
    for run in &paragraph.runs {
        let mut word = String::new();
        for c in run.text.chars() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    tokens.push(Token::Word {
                        text: std::mem::take(&mut word),
                        style: &run.style,
                        space_before: pending_space,
                    });
                }
                if c == '\n' {
                    tokens.push(Token::Break);
                    pending_space = false;
                } else {
                    pending_space = true;
                }
            } else {
                word.push(c);
            }
        }
        if !word.is_empty() {
            tokens.push(Token::Word {
                text: word,
                style: &run.style,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    tokens
}

struct Segment<'a> {
    text: String,
    style: &'a RunStyle,
    x: f32,
    width: f32,
}

#[derive(Default)]
struct Line<'a> {
    segments: Vec<Segment<'a>>,
    width: f32,
    max_size: f32,
}

struct Measure<'s> {
    style: &'s TemplateStyle,
}

impl Measure<'_> {
    fn size(&self, run: &RunStyle) -> f32 {
        self.style.size_pt(run.size)
    }

    fn word(&self, text: &str, run: &RunStyle) -> f32 {
        let face = self.style.font(run.font);
        get_metrics(face.pdf_base).measure_pt(text, self.size(run), run.bold)
    }

    fn space(&self, run: &RunStyle) -> f32 {
        let face = self.style.font(run.font);
        get_metrics(face.pdf_base).space_pt(self.size(run), run.bold)
    }
}

fn break_lines<'a>(tokens: Vec<Token<'a>>, max_width: f32, measure: &Measure<'_>) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for token in tokens {
        let (text, style, space_before) = match token {
            Token::Break => {
                lines.push(std::mem::take(&mut line));
                continue;
            }
            Token::Word {
                text,
                style,
                space_before,
            } => (text, style, space_before),
        };

        let word_w = measure.word(&text, style);
        if word_w <= max_width {
            place_word(&mut lines, &mut line, text, word_w, style, space_before, max_width, measure);
            continue;
        }
        // Only the first piece keeps the leading space; the rest start fresh lines.
        for (i, (piece, piece_w)) in split_word(&text, style, max_width, measure)
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                lines.push(std::mem::take(&mut line));
            }
            place_word(&mut lines, &mut line, piece, piece_w, style, space_before && i == 0, max_width, measure);
        }
    }
    if !line.segments.is_empty() {
        lines.push(line);
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn place_word<'a>(
    lines: &mut Vec<Line<'a>>,
    line: &mut Line<'a>,
    text: String,
    word_w: f32,
    style: &'a RunStyle,
    space_before: bool,
    max_width: f32,
    measure: &Measure<'_>,
) {
    let mut space_w = if space_before && !line.segments.is_empty() {
        measure.space(style)
    } else {
        0.0
    };
    if !line.segments.is_empty() && line.width + space_w + word_w > max_width {
        lines.push(std::mem::take(line));
        space_w = 0.0;
    }

    line.max_size = line.max_size.max(measure.size(style));
    match line.segments.last_mut() {
        Some(last) if last.style == style => {
            if space_w > 0.0 {
                last.text.push(' ');
            }
            last.text.push_str(&text);
            last.width += space_w + word_w;
        }
        _ => {
            let x = line.width + space_w;
            line.segments.push(Segment {
                text,
                style,
                x,
                width: word_w,
            });
        }
    }
    line.width += space_w + word_w;
}

/// Cuts a word wider than `max_width` into pieces that each fit, by character.
/// A piece always holds at least one character.
fn split_word(text: &str, style: &RunStyle, max_width: f32, measure: &Measure<'_>) -> Vec<(String, f32)> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in text.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && measure.word(&piece, style) > max_width {
            piece.pop();
            let width = measure.word(&piece, style);
            pieces.push((std::mem::take(&mut piece), width));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        let width = measure.word(&piece, style);
        pieces.push((piece, width));
    }
    pieces
}

// ────────────────────────────────────────────────────────────────────────────
// Writer
// ────────────────────────────────────────────────────────────────────────────

struct PdfWriter {
    style: &'static TemplateStyle,
    canvas: Canvas,
}

impl PdfWriter {
    fn new(style: &'static TemplateStyle) -> Self {
        let mut canvas = Canvas::default();
        canvas.ensure_page(0);
        Self { style, canvas }
    }

    fn color(&self, role: ColorRole) -> &'static str {
        self.style.color(role)
    }

    fn write_sections(&mut self, sections: &[Section], frame: Frame, mut cursor: Cursor) -> Cursor {
        for section in sections {
            if let Some(heading) = &section.heading {
                cursor = self.write_paragraph(heading, frame, cursor);
            }
            for block in &section.blocks {
                cursor = match block {
                    Block::Paragraph(p) => self.write_paragraph(p, frame, cursor),
                    Block::Table(table) => self.write_table(table, frame, cursor),
                };
            }
        }
        cursor
    }

    fn write_table(&mut self, table: &TableRegion, frame: Frame, mut cursor: Cursor) -> Cursor {
        for row in &table.rows {
            let start = cursor;
            let mut end = start;
            let mut x = frame.x;
            let mut filled = Vec::new();

            for (column, cell) in table.columns.iter().zip(&row.cells) {
                let width = frame.width * f32::from(column.width_pct) / 100.0;
                let inner = Frame {
                    x: x + CELL_PADDING,
                    width: (width - 2.0 * CELL_PADDING).max(1.0),
                };
                let cell_start = Cursor {
                    page: start.page,
                    y: start.y - CELL_PADDING,
                };
                let cell_end = self.write_sections(&cell.sections, inner, cell_start);
                end = end.furthest(Cursor {
                    page: cell_end.page,
                    y: cell_end.y - CELL_PADDING,
                });
                if let Some(role) = column.background {
                    filled.push((x, width, role));
                }
                x += width;
            }

            // Column fills run from the row top to the bottom margin on every
            // page the row touches.
            for (x, width, role) in filled {
                let hex = self.color(role);
                for page in start.page..=end.page {
                    let top = if page == start.page {
                        start.y
                    } else {
                        PAGE_HEIGHT - MARGIN
                    };
                    fill_rect(
                        self.canvas.background(page),
                        hex,
                        x,
                        MARGIN,
                        width,
                        top - MARGIN,
                    );
                }
            }
            cursor = end;
        }
        cursor
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph, frame: Frame, mut cursor: Cursor) -> Cursor {
        let pstyle = paragraph.style;
        let before = f32::from(pstyle.spacing_before);
        let after = f32::from(pstyle.spacing_after);
        cursor.y -= before;

        let measure = Measure { style: self.style };
        let lines = break_lines(
            tokenize(paragraph),
            (frame.width - RIGHT_SLACK).max(1.0),
            &measure,
        );

        let line_count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let size = if line.max_size > 0.0 {
                line.max_size
            } else {
                self.style.size_pt(crate::document::SizeScale::Body)
            };
            let height = size * LINE_HEIGHT_FACTOR;
            if cursor.y - height < MARGIN {
                cursor = Cursor::top(cursor.page + 1);
            }

            if let Some(role) = pstyle.background {
                let top = cursor.y + if i == 0 { before } else { 0.0 };
                let bottom = cursor.y - height - if i + 1 == line_count { after } else { 0.0 };
                let hex = self.color(role);
                fill_rect(
                    self.canvas.content(cursor.page),
                    hex,
                    frame.x - FILL_BLEED,
                    bottom,
                    frame.width + 2.0 * FILL_BLEED,
                    top - bottom,
                );
            }

            let offset = match pstyle.alignment {
                Alignment::Left => 0.0,
                Alignment::Center => ((frame.width - line.width) / 2.0).max(0.0),
                Alignment::Right => (frame.width - line.width).max(0.0),
            };
            let baseline = cursor.y - size;
            for segment in &line.segments {
                self.write_segment(segment, frame.x + offset, baseline, cursor.page);
            }
            cursor.y -= height;
        }

        if let Some(role) = pstyle.bottom_rule {
            if cursor.y - 2.0 * RULE_GAP < MARGIN {
                cursor = Cursor::top(cursor.page + 1);
            }
            let hex = self.color(role);
            stroke_line(
                self.canvas.content(cursor.page),
                hex,
                RULE_WIDTH,
                frame.x,
                frame.x + frame.width,
                cursor.y - RULE_GAP,
            );
            cursor.y -= 2.0 * RULE_GAP;
        }

        cursor.y -= after;
        cursor
    }

    fn write_segment(&mut self, segment: &Segment<'_>, line_x: f32, baseline: f32, page: usize) {
        let run = segment.style;
        let face = self.style.font(run.font);
        let size = self.style.size_pt(run.size);
        let hex = self.color(run.color);
        let (r, g, b) = rgb(hex);
        let x = line_x + segment.x;

        let ops = self.canvas.content(page);
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font_key(face.pdf_base, run.bold, run.italic).into(), size.into()],
        ));
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new("Td", vec![x.into(), baseline.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(&segment.text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));

        if run.underline {
            stroke_line(ops, hex, 0.5, x, x + segment.width, baseline - 1.5);
        }
    }
}

/// First identity line, used as the document title.
fn document_title(model: &DocumentModel) -> Option<String> {
    model
        .all_sections()
        .into_iter()
        .find(|s| s.kind == SectionKind::Identity)
        .and_then(|s| s.paragraphs().next())
        .map(Paragraph::plain_text)
}

pub fn write_pdf(model: &DocumentModel) -> Result<Vec<u8>, GenerationError> {
    let style = style_for(model.template);
    let mut writer = PdfWriter::new(style);
    let frame = Frame {
        x: MARGIN,
        width: PAGE_WIDTH - 2.0 * MARGIN,
    };
    writer.write_sections(&model.sections, frame, Cursor::top(0));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for (key, base) in FONTS {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => *base,
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(*key, font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let Canvas {
        backgrounds,
        content,
    } = writer.canvas;
    let mut kids: Vec<Object> = Vec::with_capacity(content.len());
    for (mut operations, foreground) in backgrounds.into_iter().zip(content) {
        operations.extend(foreground);
        let stream = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, stream));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
    };
    if let Some(title) = document_title(model) {
        info.set("Title", Object::String(win_ansi(&title), StringFormat::Literal));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ParagraphStyle, SizeScale};
    use crate::models::resume::{Experience, ResumeData};
    use crate::templates::{build_document, Template};

    fn measure() -> Measure<'static> {
        Measure {
            style: style_for(Template::Modern),
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn test_win_ansi_maps_spanish_letters() {
        assert_eq!(win_ansi("Añó"), vec![b'A', 0xF1, 0xF3]);
        assert_eq!(win_ansi("•€"), vec![0x95, 0x80]);
        assert_eq!(win_ansi("漢"), vec![b'?']);
    }

    #[test]
    fn test_tokenize_tracks_spaces_across_runs() {
        let p = Paragraph::new(ParagraphStyle::default())
            .with("Dev", RunStyle::body().bold())
            .with(" | ", RunStyle::body())
            .with("Acme", RunStyle::body());
        let words: Vec<(String, bool)> = tokenize(&p)
            .into_iter()
            .filter_map(|t| match t {
                Token::Word {
                    text, space_before, ..
                } => Some((text, space_before)),
                Token::Break => None,
            })
            .collect();
        assert_eq!(
            words,
            vec![
                ("Dev".to_string(), false),
                ("|".to_string(), true),
                ("Acme".to_string(), true)
            ]
        );
    }

    #[test]
    fn test_break_lines_wraps_long_text() {
        let text = "palabra ".repeat(60);
        let p = Paragraph::text(text, RunStyle::body(), ParagraphStyle::default());
        let lines = break_lines(tokenize(&p), 200.0, &measure());
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 200.0));
    }

    #[test]
    fn test_break_lines_splits_word_wider_than_column() {
        let url = "linkedin.com/in/ana-ruiz-martinez-desarrolladora-backend-senior-madrid-2024";
        let p = Paragraph::text(
            format!("Perfil: {url}"),
            RunStyle::body().size(SizeScale::Small),
            ParagraphStyle::default(),
        );
        let lines = break_lines(tokenize(&p), 150.0, &measure());
        assert!(lines.len() > 2);
        assert!(lines.iter().all(|l| l.width <= 150.0));
        let joined: String = lines
            .iter()
            .flat_map(|l| l.segments.iter().map(|s| s.text.as_str()))
            .collect();
        assert_eq!(joined, format!("Perfil:{url}"));
    }

    #[test]
    fn test_break_lines_merges_same_style_words() {
        let p = Paragraph::text("uno dos tres", RunStyle::body(), ParagraphStyle::default());
        let lines = break_lines(tokenize(&p), 500.0, &measure());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments.len(), 1);
        assert_eq!(lines[0].segments[0].text, "uno dos tres");
    }

    #[test]
    fn test_newline_forces_break() {
        let p = Paragraph::text("uno\ndos", RunStyle::body(), ParagraphStyle::default());
        let lines = break_lines(tokenize(&p), 500.0, &measure());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_line_height_uses_largest_run() {
        let p = Paragraph::new(ParagraphStyle::default())
            .with("Big", RunStyle::body().size(SizeScale::Display))
            .with(" small", RunStyle::body());
        let lines = break_lines(tokenize(&p), 500.0, &measure());
        assert_eq!(lines[0].max_size, style_for(Template::Modern).scale.display);
    }

    #[test]
    fn test_empty_document_is_one_page() {
        let model = build_document(&ResumeData::default(), Template::Classic);
        let bytes = write_pdf(&model).unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_long_resume_breaks_onto_more_pages() {
        let data = ResumeData {
            name: Some("Ana".to_string()),
            experiences: (0..40)
                .map(|i| Experience {
                    role: Some(format!("Puesto {i}")),
                    organization: Some("Acme".to_string()),
                    description: Some("Mantuve servicios críticos. Automaticé despliegues.".to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        for template in Template::ALL {
            let bytes = write_pdf(&build_document(&data, template)).unwrap();
            assert!(page_count(&bytes) > 1, "{template} should paginate");
        }
    }

    #[test]
    fn test_cursor_furthest() {
        let a = Cursor { page: 0, y: 100.0 };
        let b = Cursor { page: 1, y: 700.0 };
        let c = Cursor { page: 0, y: 50.0 };
        assert_eq!(a.furthest(b), b);
        assert_eq!(a.furthest(c), c);
        assert_eq!(b.furthest(c), b);
    }
}
