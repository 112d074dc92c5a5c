//! One export view and its four channels.
//!
//! All state sits behind one mutex and is never held across an `.await`:
//! a channel locks to transition into `Generating`, releases, awaits the
//! generator, then locks again to land in `Ready` or `Failed`.
//!
//! Preview results carry the epoch they were started under. Template
//! changes, retries and hiding the view bump the epoch, so a result that
//! arrives late is dropped instead of installed and the last requested
//! template always wins.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::export::channel::{Channel, ChannelBoard, ChannelOutput, ChannelState};
use crate::export::error::ExportError;
use crate::export::generator::ArtifactGenerator;
use crate::export::host::ExportHost;
use crate::export::preview::{PreviewHandle, PreviewRegistry, PreviewResource};
use crate::models::ResumeData;
use crate::render::{GeneratedArtifact, GenerationError};
use crate::resume::validate;
use crate::templates::Template;

/// What a UI needs to render the export view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub template: Template,
    pub visible: bool,
    pub channels: ChannelBoard,
    /// Channels whose control may be triggered right now.
    pub enabled: Vec<Channel>,
    pub last_activity: DateTime<Utc>,
}

struct SessionState {
    template: Template,
    visible: bool,
    preview_epoch: u64,
    channels: ChannelBoard,
    preview: Option<PreviewHandle>,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    fn is_enabled(&self, channel: Channel) -> bool {
        let idle = !self.channels.get(channel).is_generating();
        match channel {
            Channel::Preview => idle && self.visible,
            _ => idle,
        }
    }
}

struct SessionInner {
    id: Uuid,
    data: Arc<ResumeData>,
    generator: Arc<dyn ArtifactGenerator>,
    host: Arc<dyn ExportHost>,
    previews: PreviewRegistry,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

#[derive(Clone)]
pub struct ExportSession {
    inner: Arc<SessionInner>,
}

impl ExportSession {
    /// Opens a hidden view over an immutable snapshot of `data`.
    pub fn open(
        data: ResumeData,
        template: Template,
        generator: Arc<dyn ArtifactGenerator>,
        host: Arc<dyn ExportHost>,
        previews: PreviewRegistry,
    ) -> Self {
        let id = Uuid::new_v4();
        let state = SessionState {
            template,
            visible: false,
            preview_epoch: 0,
            channels: ChannelBoard::default(),
            preview: None,
            last_activity: Utc::now(),
        };
        let (updates, _) = watch::channel(snapshot_of(id, &state));
        Self {
            inner: Arc::new(SessionInner {
                id,
                data: Arc::new(data),
                generator,
                host,
                previews,
                state: Mutex::new(state),
                updates,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(self.inner.id, &self.inner.state.lock())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn state(&self, channel: Channel) -> ChannelState {
        self.inner.state.lock().channels.get(channel).clone()
    }

    /// Whether the control for `channel` should be enabled. A channel that
    /// is generating rejects new triggers; the preview also needs a visible
    /// view.
    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.inner.state.lock().is_enabled(channel)
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.inner.state.lock().last_activity
    }

    pub fn touch(&self) {
        self.inner.state.lock().last_activity = Utc::now();
    }

    /// Bytes of the installed preview, if any.
    pub fn preview(&self) -> Option<PreviewResource> {
        let id = self.inner.state.lock().preview.as_ref().map(PreviewHandle::id)?;
        self.inner.previews.get(id)
    }

    pub fn preview_bytes(&self) -> Option<Bytes> {
        self.preview().map(|p| p.bytes)
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    /// View became visible: starts preview generation.
    pub fn show(&self) -> JoinHandle<()> {
        {
            let mut state = self.inner.state.lock();
            state.visible = true;
            state.last_activity = Utc::now();
        }
        self.start_preview()
    }

    /// View hidden or closed: discards any in-flight preview and releases
    /// the installed one. Download channels keep running.
    pub fn hide(&self) {
        let (released, running) = {
            let mut state = self.inner.state.lock();
            state.visible = false;
            state.preview_epoch += 1;
            state.channels.set(Channel::Preview, ChannelState::Idle);
            (state.preview.take(), state.channels.busy().len())
        };
        // Released outside the session lock.
        drop(released);
        debug!(
            "Export view {} hidden ({running} export(s) still running)",
            self.inner.id
        );
        self.publish();
    }

    /// Template change. Regenerates the preview when visible; a preview still
    /// in flight for the previous template will be discarded.
    pub fn select_template(&self, template: Template) -> Option<JoinHandle<()>> {
        let visible = {
            let mut state = self.inner.state.lock();
            state.last_activity = Utc::now();
            let failed = matches!(state.channels.preview, ChannelState::Failed { .. });
            if state.template == template && !failed {
                return None;
            }
            state.template = template;
            state.visible
        };
        info!("Export view {} switched to {template}", self.inner.id);
        if visible {
            Some(self.start_preview())
        } else {
            self.publish();
            None
        }
    }

    /// User-initiated retry on the preview channel.
    pub fn retry_preview(&self) -> Result<JoinHandle<()>, ExportError> {
        {
            let state = self.inner.state.lock();
            if !state.visible {
                return Err(ExportError::ViewHidden);
            }
            if state.channels.preview.is_generating() {
                return Err(ExportError::ChannelBusy(Channel::Preview));
            }
        }
        Ok(self.start_preview())
    }

    /// Explicit trigger on one channel.
    ///
    /// Download channels run the validator first and fail without generating
    /// anything when it rejects the data. A channel already generating
    /// rejects the trigger; other channels are unaffected.
    pub fn request_export(&self, channel: Channel) -> Result<JoinHandle<()>, ExportError> {
        if !channel.is_download() {
            return self.retry_preview();
        }

        let template = {
            let mut state = self.inner.state.lock();
            state.last_activity = Utc::now();
            if state.channels.get(channel).is_generating() {
                return Err(ExportError::ChannelBusy(channel));
            }

            let report = validate(&self.inner.data);
            if !report.is_valid {
                let message = report.joined();
                state
                    .channels
                    .set(channel, ChannelState::Failed { errors: report.errors });
                drop(state);
                info!("{channel} export blocked by validation: {message}");
                self.publish();
                return Err(ExportError::Validation(message));
            }

            state.channels.set(channel, ChannelState::generating());
            channel.format().resolve_template(state.template)
        };
        self.publish();

        let session = self.clone();
        Ok(tokio::spawn(async move {
            session.run_export(channel, template).await;
        }))
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn start_preview(&self) -> JoinHandle<()> {
        let (epoch, template) = {
            let mut state = self.inner.state.lock();
            state.preview_epoch += 1;
            state.channels.set(Channel::Preview, ChannelState::generating());
            (state.preview_epoch, state.template)
        };
        self.publish();

        let report = validate(&self.inner.data);
        if !report.is_valid {
            warn!(
                "Preview for {} rendered with incomplete data: {}",
                self.inner.id,
                report.joined()
            );
        }

        let session = self.clone();
        tokio::spawn(async move {
            let result = session
                .inner
                .generator
                .generate(
                    Arc::clone(&session.inner.data),
                    template,
                    Channel::Preview.format(),
                )
                .await;
            session.finish_preview(epoch, result);
        })
    }

    fn finish_preview(&self, epoch: u64, result: Result<GeneratedArtifact, GenerationError>) {
        {
            let mut state = self.inner.state.lock();
            if epoch != state.preview_epoch || !state.visible {
                debug!(
                    "Discarding stale preview for {} (epoch {epoch}, current {})",
                    self.inner.id, state.preview_epoch
                );
                return;
            }

            // The previous handle is released whatever the outcome, so a failed
            // switch never leaves another template's preview installed.
            drop(state.preview.take());

            let next = match result {
                Ok(artifact) => {
                    match self.inner.previews.install(&artifact) {
                        Ok(handle) => {
                            let mut output = ChannelOutput::from_artifact(&artifact);
                            output.preview_id = Some(handle.id());
                            state.preview = Some(handle);
                            ChannelState::Ready(output)
                        }
                        Err(e) => {
                            warn!("Could not install preview for {}: {e}", self.inner.id);
                            ChannelState::failed(e.to_string())
                        }
                    }
                }
                Err(e) => {
                    warn!("Preview generation failed for {}: {e}", self.inner.id);
                    ChannelState::failed(e.to_string())
                }
            };
            state.channels.set(Channel::Preview, next);
        }
        self.publish();
    }

    async fn run_export(&self, channel: Channel, template: Template) {
        let result = self
            .inner
            .generator
            .generate(Arc::clone(&self.inner.data), template, channel.format())
            .await;

        let saved = match result {
            Ok(artifact) => self
                .inner
                .host
                .save(&artifact)
                .await
                .map(|path| (artifact, path)),
            Err(e) => Err(e),
        };

        match saved {
            Ok((artifact, path)) => {
                let mut output = ChannelOutput::from_artifact(&artifact);
                output.saved_to = Some(path);
                self.inner
                    .state
                    .lock()
                    .channels
                    .set(channel, ChannelState::Ready(output));
                info!(
                    "{channel} export ready for {}: {}",
                    self.inner.id, artifact.file_name
                );
                // A finished download closes the view.
                self.hide();
                self.inner.host.view_closed(self.inner.id).await;
            }
            Err(e) => {
                warn!("{channel} export failed for {}: {e}", self.inner.id);
                self.inner
                    .state
                    .lock()
                    .channels
                    .set(channel, ChannelState::failed(e.to_string()));
                self.publish();
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.inner.updates.send_replace(snapshot);
    }
}

fn snapshot_of(id: Uuid, state: &SessionState) -> SessionSnapshot {
    SessionSnapshot {
        id,
        template: state.template,
        visible: state.visible,
        channels: state.channels.clone(),
        enabled: Channel::ALL
            .into_iter()
            .filter(|c| state.is_enabled(*c))
            .collect(),
        last_activity: state.last_activity,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
