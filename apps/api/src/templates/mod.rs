// Document model builders, one per visual template.
// Builders are pure: same ResumeData + template in, structurally identical
// DocumentModel out. Section order is an explicit table in each variant.

pub mod classic;
mod common;
pub mod modern;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{DocumentModel, Section, TemplateStyle};
use crate::models::ResumeData;

pub use common::labels;

/// A section builder: produces its section or `None` when there is nothing
/// to show. `None` never leaves a heading behind.
pub type SectionBuilder = fn(&ResumeData, &TemplateStyle) -> Option<Section>;

/// The two fixed visual layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Single column with a full-width header banner.
    Classic,
    /// Two columns: tinted sidebar (32%) and main column (68%).
    #[default]
    Modern,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::Classic, Template::Modern];

    /// Name used in file-name suffixes.
    pub fn display_name(self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Modern => "Modern",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown template '{0}' (expected 'classic' or 'modern')")]
pub struct UnknownTemplate(pub String);

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "clasico" | "clásico" => Ok(Template::Classic),
            "modern" | "moderno" => Ok(Template::Modern),
            _ => Err(UnknownTemplate(s.to_string())),
        }
    }
}

/// Builds the document model for `template`.
pub fn build_document(data: &ResumeData, template: Template) -> DocumentModel {
    match template {
        Template::Classic => classic::build(data),
        Template::Modern => modern::build(data),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
