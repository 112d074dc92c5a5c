use thiserror::Error;
use uuid::Uuid;

use crate::export::channel::Channel;

/// Failure to install or release a previewable resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Preview of {size} bytes exceeds the {limit}-byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Preview handle {0} was already released")]
    AlreadyReleased(Uuid),
}

/// Rejections raised synchronously when a channel is triggered.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Joined validator messages.
    #[error("{0}")]
    Validation(String),

    #[error("The {0} channel is already generating")]
    ChannelBusy(Channel),

    #[error("The view is not visible")]
    ViewHidden,

    #[error("Export session {0} not found")]
    SessionNotFound(Uuid),
}
