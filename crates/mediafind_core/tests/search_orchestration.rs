use std::sync::Once;

use mediafind_core::{
    update, AppState, CatalogEntry, DispatchSeq, Effect, MediaType, Msg, SearchQuery,
    SearchResult, DEFAULT_TOP_K,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn video(id: i64, score: f64) -> SearchResult {
    SearchResult {
        media_type: MediaType::Video,
        id,
        filename: format!("video{id}.mp4"),
        score,
        text: None,
        summary: None,
    }
}

fn transcription(id: i64, text: &str, score: f64) -> SearchResult {
    SearchResult {
        media_type: MediaType::Transcription,
        id,
        filename: format!("audio{id}.wav"),
        score,
        text: Some(text.to_string()),
        summary: None,
    }
}

fn dispatched_seq(effects: &[Effect]) -> DispatchSeq {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Search { seq, .. } => Some(*seq),
            _ => None,
        })
        .expect("search effect")
}

fn text_search(state: AppState, query: &str) -> (AppState, DispatchSeq) {
    let (state, _) = update(state, Msg::QueryChanged(query.to_string()));
    let (state, effects) = update(state, Msg::TextSearchSubmitted);
    let seq = dispatched_seq(&effects);
    (state, seq)
}

#[test]
fn text_search_results_replace_view_in_order() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::QueryChanged("car".to_string()));
    let (state, effects) = update(state, Msg::TextSearchSubmitted);
    assert_eq!(
        effects,
        vec![Effect::Search {
            seq: DispatchSeq::new(1),
            query: SearchQuery::Text {
                query: "car".to_string(),
                top_k: DEFAULT_TOP_K,
            },
        }]
    );
    assert!(state.view().search.in_flight);

    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: DispatchSeq::new(1),
            outcome: Ok(vec![video(1, 0.9)]),
        },
    );
    let view = state.view();
    assert_eq!(view.search.results, vec![video(1, 0.9)]);
    assert!(!view.search.in_flight);
}

#[test]
fn ranking_is_preserved_as_received() {
    init_logging();
    let (state, seq) = text_search(AppState::new(), "hello");
    let unsorted = vec![transcription(10, "hello", 0.3), video(1, 0.9), video(2, 0.5)];
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq,
            outcome: Ok(unsorted.clone()),
        },
    );
    assert_eq!(state.view().search.results, unsorted);
}

#[test]
fn last_dispatched_search_wins() {
    init_logging();
    let (state, slow) = text_search(AppState::new(), "car");
    let (state, fast) = text_search(state, "person");
    assert!(fast > slow);

    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: fast,
            outcome: Ok(vec![video(2, 0.95)]),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: slow,
            outcome: Ok(vec![video(1, 0.9)]),
        },
    );

    assert_eq!(state.view().search.results, vec![video(2, 0.95)]);
    assert!(state.consume_dirty());
    // The late response alone must not have touched anything.
    let (mut state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: slow,
            outcome: Err("late failure".to_string()),
        },
    );
    assert!(!state.consume_dirty());
    assert_eq!(state.view().search.error, None);
}

#[test]
fn switching_to_reference_search_supersedes_text_search() {
    init_logging();
    let (state, text_seq) = text_search(AppState::new(), "car");
    let (state, effects) = update(
        state,
        Msg::ReferenceSelected {
            media_type: MediaType::Video,
            id: 1,
        },
    );
    let reference_seq = dispatched_seq(&effects);

    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: text_seq,
            outcome: Ok(vec![video(1, 0.9)]),
        },
    );
    assert!(state.view().search.results.is_empty());
    assert!(state.view().search.in_flight);

    let hits = vec![video(2, 0.95), transcription(11, "world", 0.85)];
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: reference_seq,
            outcome: Ok(hits.clone()),
        },
    );
    assert_eq!(state.view().search.results, hits);
}

#[test]
fn failed_search_without_prior_results_stays_empty() {
    init_logging();
    let (state, seq) = text_search(AppState::new(), "");
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq,
            outcome: Err("HTTP 422".to_string()),
        },
    );
    let view = state.view();
    assert!(view.search.results.is_empty());
    assert_eq!(view.search.error.as_deref(), Some("HTTP 422"));
}

#[test]
fn empty_query_is_forwarded() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::TextSearchSubmitted);
    assert_eq!(
        effects,
        vec![Effect::Search {
            seq: DispatchSeq::new(1),
            query: SearchQuery::Text {
                query: String::new(),
                top_k: DEFAULT_TOP_K,
            },
        }]
    );
}

#[test]
fn catalog_slots_load_independently() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Initialize);
    assert_eq!(
        effects,
        vec![
            Effect::LoadCatalog {
                media_type: MediaType::Video
            },
            Effect::LoadCatalog {
                media_type: MediaType::Transcription
            },
        ]
    );

    let (state, _) = update(
        state,
        Msg::CatalogLoaded {
            media_type: MediaType::Video,
            outcome: Err("HTTP 500".to_string()),
        },
    );
    assert!(!state.search().catalog_settled());
    let (state, _) = update(
        state,
        Msg::CatalogLoaded {
            media_type: MediaType::Transcription,
            outcome: Ok(vec![CatalogEntry::new(10, "audio1.wav")]),
        },
    );

    let view = state.view();
    assert!(view.search.catalog.videos.is_empty());
    assert_eq!(
        view.search.catalog.transcriptions,
        vec![CatalogEntry::new(10, "audio1.wav")]
    );
    assert!(state.search().catalog_settled());
    assert_eq!(view.search.error, None);
}

#[test]
fn reference_search_dispatches_before_catalog_arrives() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Initialize);
    let (state, effects) = update(
        state,
        Msg::ReferenceSelected {
            media_type: MediaType::Video,
            id: 1,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Search {
            seq: DispatchSeq::new(1),
            query: SearchQuery::Reference {
                media_type: MediaType::Video,
                id: 1,
                top_k: 5,
            },
        }]
    );

    let (state, _) = update(
        state,
        Msg::CatalogLoaded {
            media_type: MediaType::Video,
            outcome: Ok(vec![CatalogEntry::new(1, "video1.mp4")]),
        },
    );
    let (state, _) = update(
        state,
        Msg::SearchCompleted {
            seq: DispatchSeq::new(1),
            outcome: Ok(vec![video(2, 0.95)]),
        },
    );

    let view = state.view();
    assert_eq!(view.search.results, vec![video(2, 0.95)]);
    assert_eq!(
        view.search.catalog.find(MediaType::Video, 1),
        Some(&CatalogEntry::new(1, "video1.mp4"))
    );
}
