use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mediafind_engine::{
    CatalogItem, EngineEvent, EngineHandle, FailureKind, JobSnapshot, JobStatus, MediaKind,
    MediaType, SearchRequest, SearchResponse, SubmitReceipt, Transport, TransportError,
};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(300);

fn next_event(engine: &EngineHandle, timeout: Duration) -> Option<EngineEvent> {
    engine.recv_timeout(timeout).expect("engine loop running")
}

/// Answers every request after `latency`, counting status fetches.
struct ScriptedTransport {
    latency: Duration,
    status_calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            status_calls: AtomicUsize::new(0),
        })
    }
}

fn snapshot(job_id: &str, status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        job_id: job_id.to_string(),
        kind: None,
        status,
        progress: None,
        message: None,
        attempt: None,
        max_attempts: None,
        last_error: None,
        error: None,
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn submit_job(
        &self,
        _kind: MediaKind,
        _file: &Path,
    ) -> Result<SubmitReceipt, TransportError> {
        tokio::time::sleep(self.latency).await;
        Ok(SubmitReceipt {
            job_id: "job-1".to_string(),
            status: Some(JobStatus::Queued),
        })
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobSnapshot, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        Ok(snapshot(job_id, JobStatus::Running))
    }

    async fn fetch_job_result(&self, _job_id: &str) -> Result<serde_json::Value, TransportError> {
        tokio::time::sleep(self.latency).await;
        Ok(serde_json::json!({"text": "hello"}))
    }

    async fn list_videos(&self) -> Result<Vec<CatalogItem>, TransportError> {
        Err(TransportError::from_status(500, ""))
    }

    async fn list_transcriptions(&self) -> Result<Vec<CatalogItem>, TransportError> {
        tokio::time::sleep(self.latency).await;
        Ok(vec![CatalogItem {
            id: 10,
            filename: Some("audio1.wav".to_string()),
        }])
    }

    async fn search_text(
        &self,
        query: &str,
        _top_k: usize,
    ) -> Result<SearchResponse, TransportError> {
        // "slow" answers after everything else.
        let delay = if query == "slow" {
            self.latency * 4
        } else {
            self.latency
        };
        tokio::time::sleep(delay).await;
        Ok(SearchResponse {
            query: Some(query.to_string()),
            results: Vec::new(),
        })
    }

    async fn search_by_reference(
        &self,
        _media_type: MediaType,
        _id: i64,
        _top_k: usize,
    ) -> Result<SearchResponse, TransportError> {
        tokio::time::sleep(self.latency).await;
        Ok(SearchResponse {
            query: None,
            results: Vec::new(),
        })
    }
}

#[test]
fn status_fetch_reports_snapshot() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport.clone()).unwrap();

    engine.fetch_status(1, "job-1");
    match next_event(&engine, WAIT) {
        Some(EngineEvent::JobStatus {
            subscription,
            outcome,
        }) => {
            assert_eq!(subscription, 1);
            assert_eq!(outcome.unwrap().status, JobStatus::Running);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn closing_discards_in_flight_status() {
    let transport = ScriptedTransport::new(Duration::from_millis(100));
    let engine = EngineHandle::new(transport.clone()).unwrap();

    engine.fetch_status(1, "job-old");
    engine.close(1);
    engine.fetch_status(2, "job-new");

    match next_event(&engine, WAIT) {
        Some(EngineEvent::JobStatus {
            subscription,
            outcome,
        }) => {
            assert_eq!(subscription, 2);
            assert_eq!(outcome.unwrap().job_id, "job-new");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(next_event(&engine, QUIET).is_none());
}

#[test]
fn poll_timer_fires_after_delay() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport).unwrap();

    engine.schedule_poll(3, Duration::from_millis(50));
    assert_eq!(
        next_event(&engine, WAIT),
        Some(EngineEvent::PollDue { subscription: 3 })
    );
}

#[test]
fn closing_cancels_pending_poll_timer() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport.clone()).unwrap();

    engine.schedule_poll(4, Duration::from_millis(100));
    engine.close(4);

    assert!(next_event(&engine, QUIET).is_none());
    assert_eq!(transport.status_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn closing_one_subscription_leaves_others_running() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport).unwrap();

    engine.schedule_poll(5, Duration::from_millis(80));
    engine.schedule_poll(6, Duration::from_millis(80));
    engine.close(5);

    assert_eq!(
        next_event(&engine, WAIT),
        Some(EngineEvent::PollDue { subscription: 6 })
    );
    assert!(next_event(&engine, QUIET).is_none());
}

#[test]
fn catalog_loads_complete_independently() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport).unwrap();

    engine.load_catalog(MediaType::Video);
    engine.load_catalog(MediaType::Transcription);

    let mut videos = None;
    let mut transcriptions = None;
    for _ in 0..2 {
        match next_event(&engine, WAIT) {
            Some(EngineEvent::Catalog {
                media_type: MediaType::Video,
                outcome,
            }) => videos = Some(outcome),
            Some(EngineEvent::Catalog {
                media_type: MediaType::Transcription,
                outcome,
            }) => transcriptions = Some(outcome),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(
        videos.unwrap().unwrap_err().kind,
        FailureKind::HttpStatus(500)
    );
    assert_eq!(transcriptions.unwrap().unwrap().len(), 1);
}

#[test]
fn overlapping_searches_are_all_reported_with_their_seq() {
    let transport = ScriptedTransport::new(Duration::from_millis(20));
    let engine = EngineHandle::new(transport).unwrap();

    engine.search(
        1,
        SearchRequest::Text {
            query: "slow".to_string(),
            top_k: 5,
        },
    );
    engine.search(
        2,
        SearchRequest::Reference {
            media_type: MediaType::Video,
            id: 1,
            top_k: 5,
        },
    );

    let first = next_event(&engine, WAIT);
    let second = next_event(&engine, WAIT);
    assert!(matches!(first, Some(EngineEvent::Search { seq: 2, .. })));
    assert!(matches!(second, Some(EngineEvent::Search { seq: 1, .. })));
}

#[test]
fn submit_reports_receipt() {
    let transport = ScriptedTransport::new(Duration::from_millis(10));
    let engine = EngineHandle::new(transport).unwrap();

    engine.submit(MediaKind::Video, "clip.mp4");
    match next_event(&engine, WAIT) {
        Some(EngineEvent::Submitted(Ok(receipt))) => assert_eq!(receipt.job_id, "job-1"),
        other => panic!("unexpected event {other:?}"),
    }
}
