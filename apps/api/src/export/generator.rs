use std::sync::Arc;

use async_trait::async_trait;

use crate::models::ResumeData;
use crate::render::{produce, ArtifactFormat, GeneratedArtifact, GenerationError};
use crate::templates::Template;

/// Produces one artifact from a résumé snapshot.
///
/// The only suspension point of a channel. Implementations must not hold on
/// to `data` past the returned future.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(
        &self,
        data: Arc<ResumeData>,
        template: Template,
        format: ArtifactFormat,
    ) -> Result<GeneratedArtifact, GenerationError>;
}

/// Builder + serializer on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPipeline;

#[async_trait]
impl ArtifactGenerator for DocumentPipeline {
    async fn generate(
        &self,
        data: Arc<ResumeData>,
        template: Template,
        format: ArtifactFormat,
    ) -> Result<GeneratedArtifact, GenerationError> {
        tokio::task::spawn_blocking(move || produce(&data, template, format)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pipeline_resolves_pinned_template() {
        let data = Arc::new(ResumeData {
            name: Some("Ana".to_string()),
            surname: Some("Ruiz".to_string()),
            ..Default::default()
        });
        let artifact = DocumentPipeline
            .generate(data, Template::Modern, ArtifactFormat::DocxClassic)
            .await
            .unwrap();
        assert_eq!(artifact.template, Template::Classic);
        assert_eq!(artifact.file_name, "Ana_Ruiz_CV_Classic.docx");
        assert!(artifact.bytes.starts_with(b"PK"));
    }
}
