use std::sync::Arc;
use std::time::Duration;

use client_logging::{client_debug, client_warn};
use mediafind_core::{
    CatalogEntry, DispatchSeq, Effect, Job, JobId, JobResult, JobStatus, MediaKind, MediaType,
    Msg, SearchQuery, SearchResult, SubscriptionId,
};
use mediafind_engine::{
    CatalogItem, EngineEvent, EngineHandle, JobSnapshot, ReqwestTransport, SearchHit,
    SearchRequest, Transport, TransportSettings,
};

/// Executes core effects on the engine and turns engine events back into
/// core messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: TransportSettings) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(settings)?;
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> anyhow::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(transport)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            client_debug!("effect {:?}", effect);
            match effect {
                Effect::SubmitJob { kind, path } => self.engine.submit(map_kind(kind), path),
                Effect::FetchJobStatus {
                    subscription,
                    job_id,
                } => self
                    .engine
                    .fetch_status(subscription.get(), job_id.as_str()),
                Effect::SchedulePoll {
                    subscription,
                    delay,
                } => self.engine.schedule_poll(subscription.get(), delay),
                Effect::FetchJobResult {
                    subscription,
                    job_id,
                } => self
                    .engine
                    .fetch_result(subscription.get(), job_id.as_str()),
                Effect::CloseSubscription { subscription } => self.engine.close(subscription.get()),
                Effect::LoadCatalog { media_type } => {
                    self.engine.load_catalog(map_media_type_out(media_type))
                }
                Effect::Search { seq, query } => {
                    self.engine.search(seq.get(), map_query(query));
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine completion. Fails once the
    /// engine loop is gone, since nothing could ever arrive after that.
    pub fn next_msg(&self, timeout: Duration) -> anyhow::Result<Option<Msg>> {
        Ok(self.engine.recv_timeout(timeout)?.map(map_event))
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted(outcome) => Msg::UploadCompleted(
            outcome
                .map(|receipt| JobId::new(receipt.job_id))
                .map_err(|err| err.message),
        ),
        EngineEvent::JobStatus {
            subscription,
            outcome,
        } => Msg::JobStatusFetched {
            subscription: SubscriptionId::new(subscription),
            outcome: outcome.map(map_job).map_err(|err| err.message),
        },
        EngineEvent::PollDue { subscription } => Msg::PollDue {
            subscription: SubscriptionId::new(subscription),
        },
        EngineEvent::JobResult {
            subscription,
            outcome,
        } => Msg::JobResultFetched {
            subscription: SubscriptionId::new(subscription),
            outcome: outcome.map(JobResult).map_err(|err| err.message),
        },
        EngineEvent::Catalog {
            media_type,
            outcome,
        } => Msg::CatalogLoaded {
            media_type: map_media_type_in(media_type),
            outcome: outcome
                .map(|items| items.into_iter().map(map_entry).collect())
                .map_err(|err| err.message),
        },
        EngineEvent::Search { seq, outcome } => {
            if let Err(err) = &outcome {
                client_warn!("search {} failed: {} ({})", seq, err.message, err.kind);
            }
            Msg::SearchCompleted {
                seq: DispatchSeq::new(seq),
                outcome: outcome
                    .map(|response| response.results.into_iter().map(map_hit).collect())
                    .map_err(|err| err.message),
            }
        }
    }
}

fn map_job(snapshot: JobSnapshot) -> Job {
    let last_error = snapshot.failure_reason().map(ToOwned::to_owned);
    Job {
        id: JobId::new(snapshot.job_id),
        status: map_status(snapshot.status),
        kind: snapshot.kind.map(|kind| match kind {
            mediafind_engine::MediaKind::Video => MediaKind::Video,
            mediafind_engine::MediaKind::Audio => MediaKind::Audio,
        }),
        progress: snapshot.progress,
        message: snapshot.message,
        attempt: snapshot.attempt,
        max_attempts: snapshot.max_attempts,
        last_error,
    }
}

fn map_status(status: mediafind_engine::JobStatus) -> JobStatus {
    match status {
        mediafind_engine::JobStatus::Queued => JobStatus::Queued,
        mediafind_engine::JobStatus::Running => JobStatus::Running,
        mediafind_engine::JobStatus::Retrying => JobStatus::Retrying,
        mediafind_engine::JobStatus::Succeeded => JobStatus::Succeeded,
        mediafind_engine::JobStatus::Failed => JobStatus::Failed,
    }
}

fn map_hit(hit: SearchHit) -> SearchResult {
    SearchResult {
        media_type: map_media_type_in(hit.media_type),
        id: hit.id,
        filename: hit.filename.unwrap_or_default(),
        score: hit.score,
        text: hit.text,
        summary: hit.summary,
    }
}

fn map_entry(item: CatalogItem) -> CatalogEntry {
    CatalogEntry::new(item.id, item.filename.unwrap_or_default())
}

fn map_query(query: SearchQuery) -> SearchRequest {
    match query {
        SearchQuery::Text { query, top_k } => SearchRequest::Text { query, top_k },
        SearchQuery::Reference {
            media_type,
            id,
            top_k,
        } => SearchRequest::Reference {
            media_type: map_media_type_out(media_type),
            id,
            top_k,
        },
    }
}

fn map_kind(kind: MediaKind) -> mediafind_engine::MediaKind {
    match kind {
        MediaKind::Video => mediafind_engine::MediaKind::Video,
        MediaKind::Audio => mediafind_engine::MediaKind::Audio,
    }
}

fn map_media_type_in(media_type: mediafind_engine::MediaType) -> MediaType {
    match media_type {
        mediafind_engine::MediaType::Video => MediaType::Video,
        mediafind_engine::MediaType::Transcription => MediaType::Transcription,
    }
}

fn map_media_type_out(media_type: MediaType) -> mediafind_engine::MediaType {
    match media_type {
        MediaType::Video => mediafind_engine::MediaType::Video,
        MediaType::Transcription => mediafind_engine::MediaType::Transcription,
    }
}
