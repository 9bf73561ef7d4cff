use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag of a job poll cycle, minted by the caller.
pub type SubscriptionId = u64;
/// Tag of a search dispatch, minted by the caller.
pub type DispatchSeq = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    pub(crate) fn upload_path(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Transcription,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Transcription => "transcription",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Retrying,
    Succeeded,
    Failed,
}

/// Response to `POST /process/{video,audio}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitReceipt {
    pub job_id: String,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Response to `GET /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSnapshot {
    #[serde(alias = "id")]
    pub job_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<MediaKind>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub attempt: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    /// `last_error`, falling back to the older `error` field.
    pub fn failure_reason(&self) -> Option<&str> {
        self.last_error.as_deref().or(self.error.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(alias = "type")]
    pub media_type: MediaType,
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<String>,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    Text {
        query: String,
        top_k: usize,
    },
    Reference {
        media_type: MediaType,
        id: i64,
        top_k: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted(Result<SubmitReceipt, TransportError>),
    JobStatus {
        subscription: SubscriptionId,
        outcome: Result<JobSnapshot, TransportError>,
    },
    PollDue {
        subscription: SubscriptionId,
    },
    JobResult {
        subscription: SubscriptionId,
        outcome: Result<serde_json::Value, TransportError>,
    },
    Catalog {
        media_type: MediaType,
        outcome: Result<Vec<CatalogItem>, TransportError>,
    },
    Search {
        seq: DispatchSeq,
        outcome: Result<SearchResponse, TransportError>,
    },
}

/// The engine's event loop has exited; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine event loop stopped")]
pub struct EngineStopped;

/// A failed request. `message` is what gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Non-success response: body text, or `HTTP <status>` when the body is empty.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        };
        Self::new(FailureKind::HttpStatus(status), message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
