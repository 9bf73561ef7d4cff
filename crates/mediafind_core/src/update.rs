use client_logging::client_info;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Initialize => state.search_mut().initialize(),
        Msg::UploadRequested { kind, path } => {
            if !state.upload_mut().begin(kind) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            vec![Effect::SubmitJob { kind, path }]
        }
        Msg::UploadCompleted(outcome) => {
            state.mark_dirty();
            match state.upload_mut().finish(outcome) {
                Some(job_id) => {
                    client_info!("upload accepted as job {}", job_id);
                    state.tracker_mut().bind(Some(job_id))
                }
                None => Vec::new(),
            }
        }
        Msg::JobBound(job_id) => {
            state.mark_dirty();
            state.tracker_mut().bind(job_id)
        }
        Msg::TrackingCancelled => {
            let effects = state.tracker_mut().cancel();
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::JobStatusFetched {
            subscription,
            outcome,
        } => applied(
            &mut state,
            |s| s.tracker_mut().status_fetched(subscription, outcome),
        ),
        Msg::PollDue { subscription } => state
            .tracker_mut()
            .poll_due(subscription)
            .unwrap_or_default(),
        Msg::JobResultFetched {
            subscription,
            outcome,
        } => applied(
            &mut state,
            |s| s.tracker_mut().result_fetched(subscription, outcome),
        ),
        Msg::QueryChanged(text) => {
            state.search_mut().set_query_text(text);
            state.mark_dirty();
            Vec::new()
        }
        Msg::TextSearchSubmitted => {
            state.mark_dirty();
            state.search_mut().run_text_search()
        }
        Msg::ReferenceSelected { media_type, id } => {
            state.mark_dirty();
            state.search_mut().run_reference_search(media_type, id)
        }
        Msg::SearchCompleted { seq, outcome } => {
            if state.search_mut().search_completed(seq, outcome) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CatalogLoaded {
            media_type,
            outcome,
        } => {
            if state.search_mut().catalog_loaded(media_type, outcome) {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

/// Marks the state dirty unless the completion was dropped as stale.
fn applied(
    state: &mut AppState,
    apply: impl FnOnce(&mut AppState) -> Option<Vec<Effect>>,
) -> Vec<Effect> {
    match apply(state) {
        Some(effects) => {
            state.mark_dirty();
            effects
        }
        None => Vec::new(),
    }
}
