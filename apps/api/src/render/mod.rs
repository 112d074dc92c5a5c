// Serializers: document model → binary artifact.
// Everything is written into memory; callers get the whole artifact or an error.

pub mod artifact;
mod docx;
mod error;
pub mod metrics;
mod pdf;

use bytes::Bytes;

use crate::document::{Block, DocumentModel, Section};

pub use artifact::{artifact_file_name, produce, ArtifactFormat, GeneratedArtifact};
pub use error::GenerationError;

/// Serializes `model` into the requested format.
pub fn serialize(model: &DocumentModel, format: ArtifactFormat) -> Result<Bytes, GenerationError> {
    check_model(model)?;
    if let Some(pinned) = format.fixed_template() {
        if pinned != model.template {
            return Err(GenerationError::Malformed(format!(
                "{format} expects the {pinned} template, got {}",
                model.template
            )));
        }
    }
    let bytes = match format {
        ArtifactFormat::Pdf => pdf::write_pdf(model)?,
        ArtifactFormat::DocxModern | ArtifactFormat::DocxClassic => docx::write_docx(model)?,
    };
    tracing::debug!(
        "Serialized {} document as {format} ({} bytes)",
        model.template,
        bytes.len()
    );
    Ok(Bytes::from(bytes))
}

/// Structural checks the writers rely on: every table row has one cell per
/// column and column widths add up to 100%.
fn check_model(model: &DocumentModel) -> Result<(), GenerationError> {
    fn check_sections(sections: &[Section]) -> Result<(), GenerationError> {
        for section in sections {
            for block in &section.blocks {
                let Block::Table(table) = block else {
                    continue;
                };
                if table.columns.is_empty() {
                    return Err(GenerationError::Malformed(
                        "table region without columns".to_string(),
                    ));
                }
                let total: u32 = table.columns.iter().map(|c| u32::from(c.width_pct)).sum();
                if total != 100 {
                    return Err(GenerationError::Malformed(format!(
                        "column widths add up to {total}%, expected 100%"
                    )));
                }
                for row in &table.rows {
                    if row.cells.len() != table.columns.len() {
                        return Err(GenerationError::Malformed(format!(
                            "row has {} cells for {} columns",
                            row.cells.len(),
                            table.columns.len()
                        )));
                    }
                    for cell in &row.cells {
                        check_sections(&cell.sections)?;
                    }
                }
            }
        }
        Ok(())
    }
    check_sections(&model.sections)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
