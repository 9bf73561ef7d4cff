use std::path::PathBuf;

use crate::{
    CatalogEntry, DispatchSeq, Job, JobId, JobResult, MediaKind, MediaType, SearchResult,
    SubscriptionId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Start-up: load the reference catalog.
    Initialize,
    /// User picked a file to process.
    UploadRequested { kind: MediaKind, path: PathBuf },
    /// Backend accepted (or rejected) the upload.
    UploadCompleted(Result<JobId, String>),
    /// Track a job, or stop tracking with `None`.
    JobBound(Option<JobId>),
    /// Stop tracking but keep the last observation.
    TrackingCancelled,
    JobStatusFetched {
        subscription: SubscriptionId,
        outcome: Result<Job, String>,
    },
    /// The poll delay for a subscription elapsed.
    PollDue { subscription: SubscriptionId },
    JobResultFetched {
        subscription: SubscriptionId,
        outcome: Result<JobResult, String>,
    },
    /// User edited the search box.
    QueryChanged(String),
    /// User asked to run the text search.
    TextSearchSubmitted,
    /// User picked a catalog entry to search by.
    ReferenceSelected { media_type: MediaType, id: i64 },
    SearchCompleted {
        seq: DispatchSeq,
        outcome: Result<Vec<SearchResult>, String>,
    },
    CatalogLoaded {
        media_type: MediaType,
        outcome: Result<Vec<CatalogEntry>, String>,
    },
}
