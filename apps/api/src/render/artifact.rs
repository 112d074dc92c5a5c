//! Artifact formats, naming and the build → serialize pipeline.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::{text, ResumeData};
use crate::render::{serialize, GenerationError};
use crate::templates::{build_document, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactFormat {
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "docx-modern")]
    DocxModern,
    #[serde(rename = "docx-classic")]
    DocxClassic,
}

impl ArtifactFormat {
    pub fn tag(self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::DocxModern => "docx-modern",
            ArtifactFormat::DocxClassic => "docx-classic",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::DocxModern | ArtifactFormat::DocxClassic => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ArtifactFormat::Pdf => "application/pdf",
            ArtifactFormat::DocxModern | ArtifactFormat::DocxClassic => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Word formats pin their template; PDF follows the selected one.
    pub fn fixed_template(self) -> Option<Template> {
        match self {
            ArtifactFormat::Pdf => None,
            ArtifactFormat::DocxModern => Some(Template::Modern),
            ArtifactFormat::DocxClassic => Some(Template::Classic),
        }
    }

    /// Template actually rendered when `selected` is the current choice.
    pub fn resolve_template(self, selected: Template) -> Template {
        self.fixed_template().unwrap_or(selected)
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Error)]
#[error("Unknown format '{0}' (expected 'pdf', 'docx-modern' or 'docx-classic')")]
pub struct UnknownFormat(pub String);

impl FromStr for ArtifactFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ArtifactFormat::Pdf),
            "docx-modern" => Ok(ArtifactFormat::DocxModern),
            "docx-classic" => Ok(ArtifactFormat::DocxClassic),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Binary payload plus everything needed to save or display it.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub bytes: Bytes,
    pub file_name: String,
    pub format: ArtifactFormat,
    pub template: Template,
}

impl GeneratedArtifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// `"{name}_{surname}_CV_{Template}.{ext}"`. Missing names become empty
/// tokens; inner whitespace becomes `_`.
pub fn artifact_file_name(data: &ResumeData, template: Template, format: ArtifactFormat) -> String {
    let token = |value: &Option<String>| {
        text(value)
            .map(|v| v.split_whitespace().collect::<Vec<_>>().join("_"))
            .unwrap_or_default()
    };
    format!(
        "{}_{}_CV_{}.{}",
        token(&data.name),
        token(&data.surname),
        template.display_name(),
        format.extension()
    )
}

/// Builds, serializes and names one artifact. CPU-bound; async callers run
/// it on the blocking pool.
pub fn produce(
    data: &ResumeData,
    selected: Template,
    format: ArtifactFormat,
) -> Result<GeneratedArtifact, GenerationError> {
    let template = format.resolve_template(selected);
    let model = build_document(data, template);
    let bytes = serialize(&model, format)?;
    Ok(GeneratedArtifact {
        bytes,
        file_name: artifact_file_name(data, template, format),
        format,
        template,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
