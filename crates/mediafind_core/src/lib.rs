//! Mediafind core: pure job-tracking and search state machines.
mod effect;
mod model;
mod msg;
mod search;
mod state;
mod tracker;
mod update;
mod view_model;

pub use effect::Effect;
pub use model::{
    CatalogEntry, Job, JobId, JobResult, JobStatus, MediaKind, MediaType, ReferenceCatalog,
    SearchQuery, SearchResult, JOB_FAILED_FALLBACK,
};
pub use msg::Msg;
pub use search::{DispatchSeq, SearchOrchestrator};
pub use state::{AppState, CoreSettings, UploadState, DEFAULT_TOP_K, POLL_INTERVAL};
pub use tracker::{JobTracker, SubscriptionId, TrackerPhase};
pub use update::update;
pub use view_model::{AppViewModel, JobObservation, SearchView, UploadView};
