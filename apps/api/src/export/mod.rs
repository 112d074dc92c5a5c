// Export orchestrator: per-view sessions driving four independent channels
// (preview, PDF download, Word Modern, Word Classic) through
// idle → generating → ready | failed.

pub mod channel;
mod error;
pub mod generator;
pub mod handlers;
pub mod host;
pub mod preview;
pub mod session;
pub mod store;

pub use channel::{Channel, ChannelBoard, ChannelOutput, ChannelState};
pub use error::{ExportError, ResourceError};
pub use generator::{ArtifactGenerator, DocumentPipeline};
pub use host::{DiskExportHost, ExportHost};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use session::{ExportSession, SessionSnapshot};
pub use store::SessionStore;
