//! Poll-until-terminal tracking of a single backend job.
//!
//! The tracker never performs IO. It asks for work through [`Effect`]s tagged
//! with the [`SubscriptionId`] of the poll cycle that requested them, and only
//! accepts completions carrying the live subscription. Rebinding or
//! cancelling retires the subscription, so anything still in flight for it is
//! dropped on arrival.

use std::time::Duration;

use client_logging::client_debug;

use crate::{Effect, Job, JobId, JobResult, JobStatus};

/// Identifies one poll cycle. A new id is minted on every (re)bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerPhase {
    /// No job bound.
    #[default]
    Idle,
    /// Fetching status snapshots until one is terminal.
    Polling,
    /// Status reached `succeeded`; fetching the result artifact.
    Resolving,
    /// Result received. Terminal.
    Resolved,
    /// Backend reported failure, or a fetch failed. Terminal.
    Failed,
    /// Torn down before reaching a terminal phase.
    Cancelled,
}

impl TrackerPhase {
    pub fn is_active(self) -> bool {
        matches!(self, TrackerPhase::Polling | TrackerPhase::Resolving)
    }
}

/// What the live subscription is waiting for. At most one thing at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Status,
    Timer,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobTracker {
    poll_interval: Duration,
    minted: u64,
    live: Option<SubscriptionId>,
    pending: Pending,
    job_id: Option<JobId>,
    phase: TrackerPhase,
    job: Option<Job>,
    result: Option<JobResult>,
    error: Option<String>,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new(crate::POLL_INTERVAL)
    }
}

impl JobTracker {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            minted: 0,
            live: None,
            pending: Pending::Nothing,
            job_id: None,
            phase: TrackerPhase::Idle,
            job: None,
            result: None,
            error: None,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The subscription whose completions are currently accepted.
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.live
    }

    /// Bind to `job_id`, or clear with `None`.
    ///
    /// Any live cycle is closed before the new one starts. Binding the id that
    /// is already live is a no-op.
    pub fn bind(&mut self, job_id: Option<JobId>) -> Vec<Effect> {
        if job_id.is_some() && job_id == self.job_id && self.live.is_some() {
            return Vec::new();
        }

        let mut effects = self.teardown();
        self.job = None;
        self.result = None;
        self.error = None;
        self.job_id = job_id.clone();

        match job_id {
            None => {
                self.phase = TrackerPhase::Idle;
            }
            Some(job_id) => {
                self.minted += 1;
                let subscription = SubscriptionId(self.minted);
                self.live = Some(subscription);
                self.phase = TrackerPhase::Polling;
                self.pending = Pending::Status;
                client_debug!("tracking job {} as subscription {:?}", job_id, subscription);
                effects.push(Effect::FetchJobStatus {
                    subscription,
                    job_id,
                });
            }
        }
        effects
    }

    /// Stop tracking without clearing the last observation.
    pub fn cancel(&mut self) -> Vec<Effect> {
        let effects = self.teardown();
        if !effects.is_empty() {
            self.phase = TrackerPhase::Cancelled;
        }
        effects
    }

    /// Apply a status fetch. Returns `None` when the completion is stale.
    pub fn status_fetched(
        &mut self,
        subscription: SubscriptionId,
        outcome: Result<Job, String>,
    ) -> Option<Vec<Effect>> {
        if !self.accepts(subscription, Pending::Status) {
            client_debug!("dropping stale status for subscription {:?}", subscription);
            return None;
        }
        self.pending = Pending::Nothing;

        let job = match outcome {
            Ok(job) => job,
            Err(message) => return Some(self.fail(subscription, message)),
        };

        let status = job.status;
        let job_id = job.id.clone();
        let failure = (status == JobStatus::Failed).then(|| job.failure_message());
        self.job = Some(job);

        let effects = match status {
            JobStatus::Queued | JobStatus::Running | JobStatus::Retrying => {
                self.pending = Pending::Timer;
                vec![Effect::SchedulePoll {
                    subscription,
                    delay: self.poll_interval,
                }]
            }
            JobStatus::Succeeded => {
                self.phase = TrackerPhase::Resolving;
                self.pending = Pending::Result;
                vec![Effect::FetchJobResult {
                    subscription,
                    job_id,
                }]
            }
            JobStatus::Failed => self.fail(subscription, failure.unwrap_or_default()),
        };
        Some(effects)
    }

    /// The poll delay elapsed. Returns `None` when the timer is stale.
    pub fn poll_due(&mut self, subscription: SubscriptionId) -> Option<Vec<Effect>> {
        if !self.accepts(subscription, Pending::Timer) {
            client_debug!("dropping stale poll timer for subscription {:?}", subscription);
            return None;
        }
        let job_id = self.job_id.clone()?;
        self.pending = Pending::Status;
        Some(vec![Effect::FetchJobStatus {
            subscription,
            job_id,
        }])
    }

    /// Apply the result fetch. Returns `None` when the completion is stale.
    pub fn result_fetched(
        &mut self,
        subscription: SubscriptionId,
        outcome: Result<JobResult, String>,
    ) -> Option<Vec<Effect>> {
        if !self.accepts(subscription, Pending::Result) {
            client_debug!("dropping stale result for subscription {:?}", subscription);
            return None;
        }
        self.pending = Pending::Nothing;

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = TrackerPhase::Resolved;
                self.live = None;
                Some(vec![Effect::CloseSubscription { subscription }])
            }
            // The last status snapshot stays as the job observation.
            Err(message) => Some(self.fail(subscription, message)),
        }
    }

    fn accepts(&self, subscription: SubscriptionId, expected: Pending) -> bool {
        self.live == Some(subscription) && self.pending == expected
    }

    fn fail(&mut self, subscription: SubscriptionId, message: String) -> Vec<Effect> {
        self.error = Some(message);
        self.phase = TrackerPhase::Failed;
        self.pending = Pending::Nothing;
        self.live = None;
        vec![Effect::CloseSubscription { subscription }]
    }

    fn teardown(&mut self) -> Vec<Effect> {
        self.pending = Pending::Nothing;
        match self.live.take() {
            Some(subscription) => vec![Effect::CloseSubscription { subscription }],
            None => Vec::new(),
        }
    }
}
