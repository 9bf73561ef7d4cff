use crate::{
    Job, JobId, JobResult, MediaKind, ReferenceCatalog, SearchQuery, SearchResult, TrackerPhase,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub upload: UploadView,
    pub job: JobObservation,
    pub search: SearchView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub kind: MediaKind,
    pub in_flight: bool,
    pub last_job_id: Option<JobId>,
    pub error: Option<String>,
}

/// What a job observer sees: the latest snapshot, the result once resolved,
/// and the error once failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobObservation {
    pub job_id: Option<JobId>,
    pub phase: TrackerPhase,
    pub job: Option<Job>,
    pub result: Option<JobResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    pub query_text: String,
    pub active_query: Option<SearchQuery>,
    pub in_flight: bool,
    pub results: Vec<SearchResult>,
    pub error: Option<String>,
    pub catalog: ReferenceCatalog,
}
