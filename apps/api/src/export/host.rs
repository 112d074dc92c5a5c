//! The surface hosting an export view: where finished downloads go and who
//! is told when the view closes.

use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::render::{GeneratedArtifact, GenerationError};

#[async_trait]
pub trait ExportHost: Send + Sync {
    /// Persists a finished download and returns where it landed.
    async fn save(&self, artifact: &GeneratedArtifact) -> Result<PathBuf, GenerationError>;

    /// Called after a download completed and the view was closed.
    async fn view_closed(&self, session_id: Uuid);
}

/// Upper bound on `_2`, `_3`, ... suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes downloads into a directory, atomically. Existing files are never
/// replaced; a clashing name gets a numbered suffix.
#[derive(Debug, Clone)]
pub struct DiskExportHost {
    dir: PathBuf,
}

impl DiskExportHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Keeps a file name inside the export directory.
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "export".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `n`-th candidate for `name`: the name itself, then `stem_2.ext`, `stem_3.ext`...
fn numbered(name: &str, n: usize) -> String {
    if n == 1 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{name}_{n}"),
    }
}

#[async_trait]
impl ExportHost for DiskExportHost {
    async fn save(&self, artifact: &GeneratedArtifact) -> Result<PathBuf, GenerationError> {
        let dir = self.dir.clone();
        let name = safe_file_name(&artifact.file_name);
        let bytes = artifact.bytes.clone();

        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, GenerationError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            for n in 1..=MAX_NAME_ATTEMPTS {
                let target = dir.join(numbered(&name, n));
                match tmp.persist_noclobber(&target) {
                    Ok(_) => return Ok(target),
                    Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
                    Err(e) => return Err(e.error.into()),
                }
            }
            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("no free file name for {name} after {MAX_NAME_ATTEMPTS} attempts"),
            )
            .into())
        })
        .await??;

        info!("Saved {} ({} bytes)", path.display(), artifact.size());
        Ok(path)
    }

    async fn view_closed(&self, session_id: Uuid) {
        info!("Export view {session_id} closed");
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::render::ArtifactFormat;
    use crate::templates::Template;

    fn artifact(name: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            bytes: Bytes::from_static(b"%PDF-1.5 test"),
            file_name: name.to_string(),
            format: ArtifactFormat::Pdf,
            template: Template::Classic,
        }
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Ana_Ruiz_CV_Classic.pdf"), "Ana_Ruiz_CV_Classic.pdf");
        assert_eq!(safe_file_name("../etc/passwd"), "_etc_passwd");
        assert_eq!(safe_file_name(".."), "export");
    }

    #[tokio::test]
    async fn test_save_writes_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let host = DiskExportHost::new(dir.path().join("out"));
        let path = host.save(&artifact("Ana_Ruiz_CV_Classic.pdf")).await.unwrap();
        assert_eq!(path, dir.path().join("out").join("Ana_Ruiz_CV_Classic.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 test");
    }

    #[test]
    fn test_numbered_names() {
        assert_eq!(numbered("cv.pdf", 1), "cv.pdf");
        assert_eq!(numbered("Ana_Ruiz_CV_Modern.pdf", 2), "Ana_Ruiz_CV_Modern_2.pdf");
        assert_eq!(numbered("export", 3), "export_3");
    }

    #[tokio::test]
    async fn test_save_keeps_earlier_export_with_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let host = DiskExportHost::new(dir.path());
        let first = host.save(&artifact("cv.pdf")).await.unwrap();
        let mut second = artifact("cv.pdf");
        second.bytes = Bytes::from_static(b"%PDF-1.5 second");
        let path = host.save(&second).await.unwrap();

        assert_eq!(path, dir.path().join("cv_2.pdf"));
        assert_eq!(std::fs::read(&first).unwrap(), b"%PDF-1.5 test");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5 second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
