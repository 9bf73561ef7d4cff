use std::path::PathBuf;
use std::time::Duration;

use crate::{DispatchSeq, JobId, MediaKind, MediaType, SearchQuery, SubscriptionId};

/// IO requested by the core. Completions come back as [`crate::Msg`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitJob {
        kind: MediaKind,
        path: PathBuf,
    },
    FetchJobStatus {
        subscription: SubscriptionId,
        job_id: JobId,
    },
    /// Deliver `Msg::PollDue` after `delay` unless the subscription closes first.
    SchedulePoll {
        subscription: SubscriptionId,
        delay: Duration,
    },
    FetchJobResult {
        subscription: SubscriptionId,
        job_id: JobId,
    },
    /// The subscription is finished or torn down; cancel anything pending for it.
    CloseSubscription {
        subscription: SubscriptionId,
    },
    LoadCatalog {
        media_type: MediaType,
    },
    Search {
        seq: DispatchSeq,
        query: SearchQuery,
    },
}
