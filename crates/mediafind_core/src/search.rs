//! Search orchestration over text and reference queries.
//!
//! Dispatches may overlap in flight. Each one is tagged with a
//! [`DispatchSeq`] and a response is applied only when it carries the latest
//! tag handed out, so the last dispatched search wins regardless of arrival
//! order.

use client_logging::{client_debug, client_warn};

use crate::{CatalogEntry, Effect, MediaType, ReferenceCatalog, SearchQuery, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchSeq(u64);

impl DispatchSeq {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SlotState {
    #[default]
    Unloaded,
    Loading,
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOrchestrator {
    top_k: usize,
    query_text: String,
    dispatched: u64,
    applied: u64,
    active: Option<SearchQuery>,
    results: Vec<SearchResult>,
    error: Option<String>,
    catalog: ReferenceCatalog,
    videos: SlotState,
    transcriptions: SlotState,
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self::new(crate::DEFAULT_TOP_K)
    }
}

impl SearchOrchestrator {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            query_text: String::new(),
            dispatched: 0,
            applied: 0,
            active: None,
            results: Vec::new(),
            error: None,
            catalog: ReferenceCatalog::default(),
            videos: SlotState::Unloaded,
            transcriptions: SlotState::Unloaded,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Query of the most recent dispatch, answered or not.
    pub fn active_query(&self) -> Option<&SearchQuery> {
        self.active.as_ref()
    }

    /// True while the latest dispatch has not been answered.
    pub fn in_flight(&self) -> bool {
        self.applied < self.dispatched
    }

    /// Request both reference lists. Each slot is requested once per lifetime.
    pub fn initialize(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        for media_type in [MediaType::Video, MediaType::Transcription] {
            let slot = self.slot_mut(media_type);
            if *slot == SlotState::Unloaded {
                *slot = SlotState::Loading;
                effects.push(Effect::LoadCatalog { media_type });
            }
        }
        effects
    }

    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
    }

    /// Search for the held query text. An empty query is forwarded as is.
    pub fn run_text_search(&mut self) -> Vec<Effect> {
        let query = SearchQuery::Text {
            query: self.query_text.clone(),
            top_k: self.top_k,
        };
        vec![self.dispatch(query)]
    }

    /// Search for items similar to an existing catalog item.
    ///
    /// Does not consult the catalog, so it works before the lists arrive.
    pub fn run_reference_search(&mut self, media_type: MediaType, id: i64) -> Vec<Effect> {
        let query = SearchQuery::Reference {
            media_type,
            id,
            top_k: self.top_k,
        };
        vec![self.dispatch(query)]
    }

    /// Apply a search response. Returns `false` if it was superseded.
    pub fn search_completed(
        &mut self,
        seq: DispatchSeq,
        outcome: Result<Vec<SearchResult>, String>,
    ) -> bool {
        if seq.0 != self.dispatched || self.applied >= seq.0 {
            client_debug!(
                "dropping stale search response {:?} (latest {})",
                seq,
                self.dispatched
            );
            return false;
        }
        self.applied = seq.0;

        match outcome {
            Ok(results) => {
                self.results = results;
                self.error = None;
            }
            Err(message) => {
                client_warn!("search {:?} failed: {}", seq, message);
                self.error = Some(message);
            }
        }
        true
    }

    /// Fill one catalog slot. A failed load leaves the slot empty.
    pub fn catalog_loaded(
        &mut self,
        media_type: MediaType,
        outcome: Result<Vec<CatalogEntry>, String>,
    ) -> bool {
        let slot = self.slot_mut(media_type);
        if *slot == SlotState::Settled {
            return false;
        }
        *slot = SlotState::Settled;

        match outcome {
            Ok(entries) => match media_type {
                MediaType::Video => self.catalog.videos = entries,
                MediaType::Transcription => self.catalog.transcriptions = entries,
            },
            Err(message) => {
                client_warn!("loading {} catalog failed: {}", media_type.as_str(), message);
            }
        }
        true
    }

    pub fn catalog_settled(&self) -> bool {
        self.videos == SlotState::Settled && self.transcriptions == SlotState::Settled
    }

    fn dispatch(&mut self, query: SearchQuery) -> Effect {
        self.dispatched += 1;
        self.active = Some(query.clone());
        Effect::Search {
            seq: DispatchSeq(self.dispatched),
            query,
        }
    }

    fn slot_mut(&mut self, media_type: MediaType) -> &mut SlotState {
        match media_type {
            MediaType::Video => &mut self.videos,
            MediaType::Transcription => &mut self.transcriptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64) -> SearchResult {
        SearchResult {
            media_type: MediaType::Video,
            id,
            filename: format!("video{id}.mp4"),
            score: 0.5,
            text: None,
            summary: None,
        }
    }

    #[test]
    fn initialize_requests_each_slot_once() {
        let mut search = SearchOrchestrator::default();
        assert_eq!(
            search.initialize(),
            vec![
                Effect::LoadCatalog {
                    media_type: MediaType::Video
                },
                Effect::LoadCatalog {
                    media_type: MediaType::Transcription
                },
            ]
        );
        assert!(search.initialize().is_empty());
    }

    #[test]
    fn catalog_slot_is_written_once() {
        let mut search = SearchOrchestrator::default();
        search.initialize();
        assert!(search.catalog_loaded(MediaType::Video, Ok(vec![CatalogEntry::new(1, "a.mp4")])));
        assert!(!search.catalog_loaded(MediaType::Video, Ok(Vec::new())));
        assert_eq!(search.catalog().videos.len(), 1);
    }

    #[test]
    fn duplicate_response_for_same_dispatch_is_ignored() {
        let mut search = SearchOrchestrator::default();
        search.run_text_search();
        assert!(search.search_completed(DispatchSeq(1), Ok(vec![hit(1)])));
        assert!(!search.search_completed(DispatchSeq(1), Ok(vec![hit(2)])));
        assert_eq!(search.results(), &[hit(1)]);
    }

    #[test]
    fn failure_keeps_previous_results() {
        let mut search = SearchOrchestrator::default();
        search.run_text_search();
        search.search_completed(DispatchSeq(1), Ok(vec![hit(1)]));
        search.run_text_search();
        assert!(search.in_flight());
        search.search_completed(DispatchSeq(2), Err("HTTP 500".into()));

        assert_eq!(search.results(), &[hit(1)]);
        assert_eq!(search.error(), Some("HTTP 500"));
        assert!(!search.in_flight());
    }

    #[test]
    fn success_clears_previous_error() {
        let mut search = SearchOrchestrator::default();
        search.run_text_search();
        search.search_completed(DispatchSeq(1), Err("HTTP 500".into()));
        search.run_text_search();
        search.search_completed(DispatchSeq(2), Ok(Vec::new()));
        assert_eq!(search.error(), None);
    }
}
