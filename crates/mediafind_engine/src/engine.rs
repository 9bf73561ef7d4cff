use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_info};
use tokio::sync::mpsc as tokio_mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::Transport;
use crate::{
    DispatchSeq, EngineEvent, EngineStopped, MediaKind, MediaType, SearchRequest, SubscriptionId,
};

enum EngineCommand {
    Submit {
        kind: MediaKind,
        path: PathBuf,
    },
    FetchStatus {
        subscription: SubscriptionId,
        job_id: String,
        token: CancellationToken,
    },
    SchedulePoll {
        subscription: SubscriptionId,
        delay: Duration,
        token: CancellationToken,
    },
    FetchResult {
        subscription: SubscriptionId,
        job_id: String,
        token: CancellationToken,
    },
    LoadCatalog {
        media_type: MediaType,
    },
    Search {
        seq: DispatchSeq,
        request: SearchRequest,
    },
}

/// Runs transport requests on a background event loop and reports their
/// completions as [`EngineEvent`]s.
///
/// Work tied to a job subscription carries that subscription's
/// [`CancellationToken`]. [`EngineHandle::close`] cancels it on the calling
/// thread, so a pending poll timer never fires and an in-flight request for
/// it never produces an event afterwards.
pub struct EngineHandle {
    cmd_tx: tokio_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    tokens: Mutex<HashMap<SubscriptionId, CancellationToken>>,
}

impl EngineHandle {
    pub fn new(transport: Arc<dyn Transport>) -> io::Result<Self> {
        let (cmd_tx, mut cmd_rx) = tokio_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("mediafind-engine".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(command) = cmd_rx.recv().await {
                        let transport = transport.clone();
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            handle_command(transport.as_ref(), command, event_tx).await;
                        });
                    }
                });
                client_debug!("engine loop stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            tokens: Mutex::new(HashMap::new()),
        })
    }

    pub fn submit(&self, kind: MediaKind, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Submit {
            kind,
            path: path.into(),
        });
    }

    pub fn fetch_status(&self, subscription: SubscriptionId, job_id: impl Into<String>) {
        let token = self.token(subscription);
        self.send(EngineCommand::FetchStatus {
            subscription,
            job_id: job_id.into(),
            token,
        });
    }

    pub fn schedule_poll(&self, subscription: SubscriptionId, delay: Duration) {
        let token = self.token(subscription);
        self.send(EngineCommand::SchedulePoll {
            subscription,
            delay,
            token,
        });
    }

    pub fn fetch_result(&self, subscription: SubscriptionId, job_id: impl Into<String>) {
        let token = self.token(subscription);
        self.send(EngineCommand::FetchResult {
            subscription,
            job_id: job_id.into(),
            token,
        });
    }

    /// Cancel everything pending for `subscription`.
    pub fn close(&self, subscription: SubscriptionId) {
        let token = match self.tokens.lock() {
            Ok(mut tokens) => tokens.remove(&subscription),
            Err(poisoned) => poisoned.into_inner().remove(&subscription),
        };
        if let Some(token) = token {
            client_debug!("closing subscription {}", subscription);
            token.cancel();
        }
    }

    pub fn load_catalog(&self, media_type: MediaType) {
        self.send(EngineCommand::LoadCatalog { media_type });
    }

    pub fn search(&self, seq: DispatchSeq, request: SearchRequest) {
        self.send(EngineCommand::Search { seq, request });
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }

    fn token(&self, subscription: SubscriptionId) -> CancellationToken {
        let mut tokens = match self.tokens.lock() {
            Ok(tokens) => tokens,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens
            .entry(subscription)
            .or_insert_with(CancellationToken::new)
            .clone()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    transport: &dyn Transport,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { kind, path } => {
            client_info!("submitting {} as {:?}", path.display(), kind);
            let outcome = transport.submit_job(kind, &path).await;
            let _ = event_tx.send(EngineEvent::Submitted(outcome));
        }
        EngineCommand::FetchStatus {
            subscription,
            job_id,
            token,
        } => {
            let event = guarded(&token, async {
                let outcome = transport.fetch_job_status(&job_id).await;
                EngineEvent::JobStatus {
                    subscription,
                    outcome,
                }
            })
            .await;
            deliver(&event_tx, &token, event, subscription);
        }
        EngineCommand::SchedulePoll {
            subscription,
            delay,
            token,
        } => {
            let event = guarded(&token, async {
                tokio::time::sleep(delay).await;
                EngineEvent::PollDue { subscription }
            })
            .await;
            deliver(&event_tx, &token, event, subscription);
        }
        EngineCommand::FetchResult {
            subscription,
            job_id,
            token,
        } => {
            let event = guarded(&token, async {
                let outcome = transport.fetch_job_result(&job_id).await;
                EngineEvent::JobResult {
                    subscription,
                    outcome,
                }
            })
            .await;
            deliver(&event_tx, &token, event, subscription);
        }
        EngineCommand::LoadCatalog { media_type } => {
            let outcome = match media_type {
                MediaType::Video => transport.list_videos().await,
                MediaType::Transcription => transport.list_transcriptions().await,
            };
            let _ = event_tx.send(EngineEvent::Catalog {
                media_type,
                outcome,
            });
        }
        EngineCommand::Search { seq, request } => {
            let outcome = match &request {
                SearchRequest::Text { query, top_k } => transport.search_text(query, *top_k).await,
                SearchRequest::Reference {
                    media_type,
                    id,
                    top_k,
                } => transport.search_by_reference(*media_type, *id, *top_k).await,
            };
            let _ = event_tx.send(EngineEvent::Search { seq, outcome });
        }
    }
}

/// Runs `work` unless `token` is cancelled first.
async fn guarded<F>(token: &CancellationToken, work: F) -> Option<EngineEvent>
where
    F: std::future::Future<Output = EngineEvent>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        event = work => Some(event),
    }
}

fn deliver(
    event_tx: &mpsc::Sender<EngineEvent>,
    token: &CancellationToken,
    event: Option<EngineEvent>,
    subscription: SubscriptionId,
) {
    match event {
        Some(event) if !token.is_cancelled() => {
            let _ = event_tx.send(event);
        }
        _ => client_debug!("discarding work for closed subscription {}", subscription),
    }
}
