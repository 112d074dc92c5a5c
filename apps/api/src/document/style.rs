//! Style catalog: one immutable palette and type scale per template.
//!
//! Process-wide statics, shared read-only by every concurrent generation.

use crate::document::model::{ColorRole, FontToken, SizeScale};
use crate::templates::Template;

/// Base-14 PDF font used when the family is not embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBaseFont {
    Helvetica,
    Times,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFace {
    /// Family name written into Word documents.
    pub family: &'static str,
    /// Fallback used by the PDF writer.
    pub pdf_base: PdfBaseFont,
}

/// Colors as 6-digit RGB hex, no leading `#`.
#[derive(Debug)]
pub struct Palette {
    pub text: &'static str,
    pub muted: &'static str,
    pub primary: &'static str,
    pub accent: &'static str,
    pub inverse: &'static str,
    pub banner: &'static str,
    pub sidebar: &'static str,
    pub rule: &'static str,
}

/// Font sizes in points.
#[derive(Debug)]
pub struct TypeScale {
    pub display: f32,
    pub title: f32,
    pub heading: f32,
    pub body: f32,
    pub small: f32,
}

#[derive(Debug)]
pub struct TemplateStyle {
    pub template: Template,
    pub palette: Palette,
    pub scale: TypeScale,
    pub heading_font: FontFace,
    pub body_font: FontFace,
    /// Base vertical rhythm in points; builders use multiples of it.
    pub spacing_unit: u16,
    /// Space after each paragraph produced by the text segmenter.
    pub segment_spacing: u16,
    /// Width of the sidebar column in percent (two-column templates only).
    pub sidebar_width_pct: u8,
    /// Glue between joined fields on one line.
    pub separator: &'static str,
}

impl TemplateStyle {
    pub fn color(&self, role: ColorRole) -> &'static str {
        let p = &self.palette;
        match role {
            ColorRole::Text => p.text,
            ColorRole::Muted => p.muted,
            ColorRole::Primary => p.primary,
            ColorRole::Accent => p.accent,
            ColorRole::Inverse => p.inverse,
            ColorRole::Banner => p.banner,
            ColorRole::Sidebar => p.sidebar,
            ColorRole::Rule => p.rule,
        }
    }

    pub fn size_pt(&self, scale: SizeScale) -> f32 {
        let s = &self.scale;
        match scale {
            SizeScale::Display => s.display,
            SizeScale::Title => s.title,
            SizeScale::Heading => s.heading,
            SizeScale::Body => s.body,
            SizeScale::Small => s.small,
        }
    }

    pub fn font(&self, token: FontToken) -> FontFace {
        match token {
            FontToken::Heading => self.heading_font,
            FontToken::Body => self.body_font,
        }
    }

    /// Multiple of the spacing unit, in points.
    pub fn space(&self, steps: u16) -> u16 {
        self.spacing_unit * steps
    }
}

/// Parses a palette entry into 0.0–1.0 RGB components.
pub fn rgb(hex: &str) -> (f32, f32, f32) {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map_or(0.0, |v| f32::from(v) / 255.0)
    };
    (channel(0), channel(2), channel(4))
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// Classic: single column, serif body, dark navy banner.
pub static CLASSIC_STYLE: TemplateStyle = TemplateStyle {
    template: Template::Classic,
    palette: Palette {
        text: "222222",
        muted: "5F6B7A",
        primary: "1F3A5F",
        accent: "2E6DA4",
        inverse: "FFFFFF",
        banner: "1F3A5F",
        sidebar: "F2F4F7",
        rule: "C9CED6",
    },
    scale: TypeScale {
        display: 24.0,
        title: 13.0,
        heading: 13.0,
        body: 10.5,
        small: 9.0,
    },
    heading_font: FontFace {
        family: "Georgia",
        pdf_base: PdfBaseFont::Times,
    },
    body_font: FontFace {
        family: "Georgia",
        pdf_base: PdfBaseFont::Times,
    },
    spacing_unit: 4,
    segment_spacing: 4,
    sidebar_width_pct: 0,
    separator: " | ",
};

/// Modern: two columns, sans-serif, tinted sidebar.
pub static MODERN_STYLE: TemplateStyle = TemplateStyle {
    template: Template::Modern,
    palette: Palette {
        text: "2B2B2B",
        muted: "6B7280",
        primary: "0F766E",
        accent: "14B8A6",
        inverse: "FFFFFF",
        banner: "0F766E",
        sidebar: "E6F4F1",
        rule: "B7DCD5",
    },
    scale: TypeScale {
        display: 26.0,
        title: 12.0,
        heading: 12.0,
        body: 10.0,
        small: 8.5,
    },
    heading_font: FontFace {
        family: "Calibri",
        pdf_base: PdfBaseFont::Helvetica,
    },
    body_font: FontFace {
        family: "Calibri",
        pdf_base: PdfBaseFont::Helvetica,
    },
    spacing_unit: 4,
    segment_spacing: 3,
    sidebar_width_pct: 32,
    separator: " · ",
};

pub fn style_for(template: Template) -> &'static TemplateStyle {
    match template {
        Template::Classic => &CLASSIC_STYLE,
        Template::Modern => &MODERN_STYLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
