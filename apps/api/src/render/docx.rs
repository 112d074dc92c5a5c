//! WordprocessingML writer: a minimal OOXML package assembled with `zip`.
//!
//! Part order and element order inside `w:pPr` / `w:rPr` follow the schema
//! sequence, which Word enforces.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::document::{
    style_for, Alignment, Block, DocumentModel, Paragraph, RunStyle, Section, TableRegion,
    TemplateStyle,
};
use crate::render::GenerationError;

/// Letter, in twentieths of a point.
const PAGE_WIDTH_TWIPS: u32 = 12240;
const PAGE_HEIGHT_TWIPS: u32 = 15840;
const MARGIN_TWIPS: u32 = 720;
const TEXT_WIDTH_TWIPS: u32 = PAGE_WIDTH_TWIPS - 2 * MARGIN_TWIPS;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters are not allowed in XML 1.0.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn pt_to_twips(pt: u16) -> u32 {
    u32::from(pt) * 20
}

fn half_points(pt: f32) -> u32 {
    (pt * 2.0).round() as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Body
// ────────────────────────────────────────────────────────────────────────────

struct BodyWriter {
    style: &'static TemplateStyle,
    xml: String,
}

impl BodyWriter {
    fn sections(&mut self, sections: &[Section]) {
        for section in sections {
            if let Some(heading) = &section.heading {
                self.paragraph(heading);
            }
            for block in &section.blocks {
                match block {
                    Block::Paragraph(p) => self.paragraph(p),
                    Block::Table(t) => self.table(t),
                }
            }
        }
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        let s = paragraph.style;
        self.xml.push_str("<w:p><w:pPr>");
        if let Some(role) = s.bottom_rule {
            let _ = write!(
                self.xml,
                r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="{}"/></w:pBdr>"#,
                self.style.color(role)
            );
        }
        if let Some(role) = s.background {
            let _ = write!(
                self.xml,
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                self.style.color(role)
            );
        }
        let _ = write!(
            self.xml,
            r#"<w:spacing w:before="{}" w:after="{}"/>"#,
            pt_to_twips(s.spacing_before),
            pt_to_twips(s.spacing_after)
        );
        let jc = match s.alignment {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        };
        let _ = write!(self.xml, r#"<w:jc w:val="{jc}"/>"#);
        self.xml.push_str("</w:pPr>");

        for run in &paragraph.runs {
            self.run(&run.text, &run.style);
        }
        self.xml.push_str("</w:p>");
    }

    fn run(&mut self, text: &str, run: &RunStyle) {
        let face = self.style.font(run.font);
        self.xml.push_str("<w:r><w:rPr>");
        let _ = write!(
            self.xml,
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            face.family
        );
        if run.bold {
            self.xml.push_str("<w:b/>");
        }
        if run.italic {
            self.xml.push_str("<w:i/>");
        }
        let _ = write!(
            self.xml,
            r#"<w:color w:val="{}"/><w:sz w:val="{}"/>"#,
            self.style.color(run.color),
            half_points(self.style.size_pt(run.size))
        );
        if run.underline {
            self.xml.push_str(r#"<w:u w:val="single"/>"#);
        }
        self.xml.push_str("</w:rPr>");

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.xml.push_str("<w:br/>");
            }
            if !line.is_empty() {
                let _ = write!(
                    self.xml,
                    r#"<w:t xml:space="preserve">{}</w:t>"#,
                    escape_xml(line)
                );
            }
        }
        self.xml.push_str("</w:r>");
    }

    fn table(&mut self, table: &TableRegion) {
        let widths: Vec<u32> = table
            .columns
            .iter()
            .map(|c| TEXT_WIDTH_TWIPS * u32::from(c.width_pct) / 100)
            .collect();

        self.xml.push_str(
            r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblLayout w:type="fixed"/><w:tblBorders><w:top w:val="nil"/><w:left w:val="nil"/><w:bottom w:val="nil"/><w:right w:val="nil"/><w:insideH w:val="nil"/><w:insideV w:val="nil"/></w:tblBorders><w:tblCellMar><w:top w:w="200" w:type="dxa"/><w:left w:w="200" w:type="dxa"/><w:bottom w:w="200" w:type="dxa"/><w:right w:w="200" w:type="dxa"/></w:tblCellMar></w:tblPr><w:tblGrid>"#,
        );
        for w in &widths {
            let _ = write!(self.xml, r#"<w:gridCol w:w="{w}"/>"#);
        }
        self.xml.push_str("</w:tblGrid>");

        for row in &table.rows {
            self.xml.push_str("<w:tr>");
            for ((column, cell), width) in table.columns.iter().zip(&row.cells).zip(&widths) {
                let _ = write!(
                    self.xml,
                    r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>"#
                );
                if let Some(role) = column.background {
                    let _ = write!(
                        self.xml,
                        r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                        self.style.color(role)
                    );
                }
                self.xml.push_str("</w:tcPr>");
                let before = self.xml.len();
                self.sections(&cell.sections);
                // A cell must end with a paragraph.
                if self.xml.len() == before || self.xml.ends_with("</w:tbl>") {
                    self.xml.push_str("<w:p/>");
                }
                self.xml.push_str("</w:tc>");
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl><w:p/>");
    }
}

fn document_xml(model: &DocumentModel) -> String {
    let mut body = BodyWriter {
        style: style_for(model.template),
        xml: String::new(),
    };
    body.sections(&model.sections);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{}<w:sectPr><w:pgSz w:w="{PAGE_WIDTH_TWIPS}" w:h="{PAGE_HEIGHT_TWIPS}"/><w:pgMar w:top="{MARGIN_TWIPS}" w:right="{MARGIN_TWIPS}" w:bottom="{MARGIN_TWIPS}" w:left="{MARGIN_TWIPS}" w:header="0" w:footer="0" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        body.xml
    )
}

fn styles_xml(style: &TemplateStyle) -> String {
    let body = style.body_font.family;
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{W_NS}"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{body}" w:hAnsi="{body}" w:cs="{body}"/><w:color w:val="{}"/><w:sz w:val="{}"/><w:lang w:val="es-ES"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:before="0" w:after="0"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#,
        style.palette.text,
        half_points(style.scale.body)
    )
}

pub fn write_docx(model: &DocumentModel) -> Result<Vec<u8>, GenerationError> {
    let style = style_for(model.template);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", styles_xml(style)),
        ("word/document.xml", document_xml(model)),
    ];
    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
