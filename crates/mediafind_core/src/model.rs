use std::fmt;

/// Opaque identifier assigned by the backend when a job is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Backend job status, declared in order of progress.
///
/// `Retrying` may alternate with `Running`, so the ordering is only a hint for
/// display and never drives transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobStatus {
    Queued,
    Running,
    Retrying,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Retrying => "retrying",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

/// Message used when a job fails without the backend saying why.
pub const JOB_FAILED_FALLBACK: &str = "Job failed";

/// One polled snapshot of a job. Each snapshot replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub kind: Option<MediaKind>,
    pub progress: Option<u8>,
    pub message: Option<String>,
    pub attempt: Option<u32>,
    pub max_attempts: Option<u32>,
    pub last_error: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            kind: None,
            progress: None,
            message: None,
            attempt: None,
            max_attempts: None,
            last_error: None,
        }
    }

    pub fn with_last_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    /// Error to surface for a failed job.
    pub fn failure_message(&self) -> String {
        self.last_error
            .clone()
            .unwrap_or_else(|| JOB_FAILED_FALLBACK.to_string())
    }
}

/// Final artifact of a succeeded job. Never interpreted by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult(pub serde_json::Value);

impl JobResult {
    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Kind of media submitted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

/// Kind of item that search results and references point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
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

/// One ranked hit. Order is the backend's; the client never re-sorts.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub media_type: MediaType,
    pub id: i64,
    pub filename: String,
    pub score: f64,
    pub text: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub filename: String,
}

impl CatalogEntry {
    pub fn new(id: i64, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
        }
    }
}

/// Reference lists used to offer "find similar" choices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceCatalog {
    pub videos: Vec<CatalogEntry>,
    pub transcriptions: Vec<CatalogEntry>,
}

impl ReferenceCatalog {
    pub fn entries(&self, media_type: MediaType) -> &[CatalogEntry] {
        match media_type {
            MediaType::Video => &self.videos,
            MediaType::Transcription => &self.transcriptions,
        }
    }

    pub fn find(&self, media_type: MediaType, id: i64) -> Option<&CatalogEntry> {
        self.entries(media_type).iter().find(|entry| entry.id == id)
    }
}
