use std::time::Duration;

use crate::view_model::{AppViewModel, JobObservation, SearchView, UploadView};
use crate::{JobId, JobTracker, MediaKind, SearchOrchestrator};

/// Delay between the end of one status fetch and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Number of hits requested per search.
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    pub poll_interval: Duration,
    pub top_k: usize,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    kind: MediaKind,
    in_flight: bool,
    last_job_id: Option<JobId>,
    error: Option<String>,
}

impl UploadState {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_job_id(&self) -> Option<&JobId> {
        self.last_job_id.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `false` if a submission is already pending.
    pub(crate) fn begin(&mut self, kind: MediaKind) -> bool {
        if self.in_flight {
            return false;
        }
        self.kind = kind;
        self.in_flight = true;
        self.error = None;
        true
    }

    pub(crate) fn finish(&mut self, outcome: Result<JobId, String>) -> Option<JobId> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        match outcome {
            Ok(job_id) => {
                self.last_job_id = Some(job_id.clone());
                Some(job_id)
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    upload: UploadState,
    tracker: JobTracker,
    search: SearchOrchestrator,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            upload: UploadState::default(),
            tracker: JobTracker::new(settings.poll_interval),
            search: SearchOrchestrator::new(settings.top_k),
            dirty: false,
        }
    }

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub(crate) fn upload_mut(&mut self) -> &mut UploadState {
        &mut self.upload
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut JobTracker {
        &mut self.tracker
    }

    pub(crate) fn search_mut(&mut self) -> &mut SearchOrchestrator {
        &mut self.search
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            upload: UploadView {
                kind: self.upload.kind,
                in_flight: self.upload.in_flight,
                last_job_id: self.upload.last_job_id.clone(),
                error: self.upload.error.clone(),
            },
            job: JobObservation {
                job_id: self.tracker.job_id().cloned(),
                phase: self.tracker.phase(),
                job: self.tracker.job().cloned(),
                result: self.tracker.result().cloned(),
                error: self.tracker.error().map(ToOwned::to_owned),
            },
            search: SearchView {
                query_text: self.search.query_text().to_string(),
                active_query: self.search.active_query().cloned(),
                in_flight: self.search.in_flight(),
                results: self.search.results().to_vec(),
                error: self.search.error().map(ToOwned::to_owned),
                catalog: self.search.catalog().clone(),
            },
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything observable changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
