//! Channel identities and the per-channel state machine.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::render::{ArtifactFormat, GeneratedArtifact};
use crate::templates::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Preview,
    PdfDownload,
    WordModern,
    WordClassic,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Preview,
        Channel::PdfDownload,
        Channel::WordModern,
        Channel::WordClassic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Preview => "preview",
            Channel::PdfDownload => "pdf-download",
            Channel::WordModern => "word-modern",
            Channel::WordClassic => "word-classic",
        }
    }

    pub fn format(self) -> ArtifactFormat {
        match self {
            Channel::Preview | Channel::PdfDownload => ArtifactFormat::Pdf,
            Channel::WordModern => ArtifactFormat::DocxModern,
            Channel::WordClassic => ArtifactFormat::DocxClassic,
        }
    }

    /// Download channels are validation-gated and save to disk on success.
    pub fn is_download(self) -> bool {
        self != Channel::Preview
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown channel '{0}'")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preview" => Ok(Channel::Preview),
            "pdf" | "pdf-download" => Ok(Channel::PdfDownload),
            "word-modern" | "docx-modern" => Ok(Channel::WordModern),
            "word-classic" | "docx-classic" => Ok(Channel::WordClassic),
            _ => Err(UnknownChannel(s.to_string())),
        }
    }
}

/// What a channel produced. Downloads carry the saved path, the preview
/// carries the id of its live resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutput {
    pub file_name: String,
    pub format: ArtifactFormat,
    pub template: Template,
    pub size: usize,
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_id: Option<Uuid>,
}

impl ChannelOutput {
    pub fn from_artifact(artifact: &GeneratedArtifact) -> Self {
        Self {
            file_name: artifact.file_name.clone(),
            format: artifact.format,
            template: artifact.template,
            size: artifact.size(),
            completed_at: Utc::now(),
            saved_to: None,
            preview_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChannelState {
    #[default]
    Idle,
    Generating {
        since: DateTime<Utc>,
    },
    Ready(ChannelOutput),
    Failed {
        errors: Vec<String>,
    },
}

impl ChannelState {
    pub fn generating() -> Self {
        ChannelState::Generating { since: Utc::now() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ChannelState::Failed {
            errors: vec![message.into()],
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, ChannelState::Generating { .. })
    }

    pub fn output(&self) -> Option<&ChannelOutput> {
        match self {
            ChannelState::Ready(output) => Some(output),
            _ => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ChannelState::Failed { errors } => errors,
            _ => &[],
        }
    }
}

/// One state per channel, tracked independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBoard {
    pub preview: ChannelState,
    pub pdf_download: ChannelState,
    pub word_modern: ChannelState,
    pub word_classic: ChannelState,
}

impl ChannelBoard {
    pub fn get(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Preview => &self.preview,
            Channel::PdfDownload => &self.pdf_download,
            Channel::WordModern => &self.word_modern,
            Channel::WordClassic => &self.word_classic,
        }
    }

    pub fn set(&mut self, channel: Channel, state: ChannelState) {
        let slot = match channel {
            Channel::Preview => &mut self.preview,
            Channel::PdfDownload => &mut self.pdf_download,
            Channel::WordModern => &mut self.word_modern,
            Channel::WordClassic => &mut self.word_classic,
        };
        *slot = state;
    }

    /// Channels currently generating.
    pub fn busy(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_generating())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
