//! Previewable resources: in-memory artifacts addressed by id, each owned by
//! exactly one RAII handle.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::export::error::ResourceError;
use crate::render::GeneratedArtifact;

#[derive(Debug, Clone)]
pub struct PreviewResource {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: &'static str,
}

#[derive(Debug)]
struct RegistryInner {
    max_bytes: usize,
    resources: Mutex<HashMap<Uuid, PreviewResource>>,
}

impl RegistryInner {
    fn release(&self, id: Uuid) -> Result<(), ResourceError> {
        self.resources
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::AlreadyReleased(id))
    }
}

/// Process-wide table of live preview resources.
#[derive(Debug, Clone)]
pub struct PreviewRegistry {
    inner: Arc<RegistryInner>,
}

impl PreviewRegistry {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                max_bytes,
                resources: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Registers the artifact and returns the handle that keeps it alive.
    pub fn install(&self, artifact: &GeneratedArtifact) -> Result<PreviewHandle, ResourceError> {
        let size = artifact.size();
        if size > self.inner.max_bytes {
            return Err(ResourceError::TooLarge {
                size,
                limit: self.inner.max_bytes,
            });
        }
        let id = Uuid::new_v4();
        self.inner.resources.lock().insert(
            id,
            PreviewResource {
                bytes: artifact.bytes.clone(),
                file_name: artifact.file_name.clone(),
                mime_type: artifact.format.mime_type(),
            },
        );
        debug!("Installed preview {id} ({size} bytes)");
        Ok(PreviewHandle {
            id,
            registry: Arc::clone(&self.inner),
        })
    }

    pub fn get(&self, id: Uuid) -> Option<PreviewResource> {
        self.inner.resources.lock().get(&id).cloned()
    }

    /// Number of resources currently alive.
    pub fn live_count(&self) -> usize {
        self.inner.resources.lock().len()
    }
}

/// Owns one preview resource; dropping it releases the resource.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: Arc<RegistryInner>,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        match self.registry.release(self.id) {
            Ok(()) => debug!("Released preview {}", self.id),
            Err(e) => warn!("{e}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
