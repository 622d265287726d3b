//! End-to-end engine flows against an in-memory store and a scripted API.

use std::cell::Cell;

use factstash::api::ApiFailure;
use factstash::cache::LocalData;
use factstash::engine::SearchEngine;
use factstash::state::{Effect, Fact, SearchAction};
use factstash::storage::{
    CATEGORIES_KEY, KvStore, LOCAL_DATA_KEY, MemoryStore, PAST_SEARCHES_KEY,
};

fn fact(id: &str, value: &str) -> Fact {
    Fact {
        icon_url: String::new(),
        id: id.into(),
        url: String::new(),
        value: value.into(),
        categories: Vec::new(),
    }
}

fn fixed_engine() -> SearchEngine {
    SearchEngine::new(Box::new(|| 42), Box::new(|| 7))
}

/// Synchronous effect executor: persistence against `store`, network
/// against the two scripted responders, completions fed straight back in.
fn drive(
    engine: &mut SearchEngine,
    store: &MemoryStore,
    action: SearchAction,
    search: &dyn Fn(&str) -> Result<Vec<Fact>, ApiFailure>,
    categories: &dyn Fn() -> Result<Vec<String>, ApiFailure>,
) {
    let mut queue = vec![action];
    while !queue.is_empty() {
        let next = queue.remove(0);
        for effect in engine.apply(next) {
            match effect {
                Effect::LoadPastSearches => queue.push(SearchAction::PastSearchesLoaded(
                    store.load_string_list(PAST_SEARCHES_KEY),
                )),
                Effect::LoadCategories => queue.push(SearchAction::CategoriesLoaded(
                    store.load_string_list(CATEGORIES_KEY),
                )),
                Effect::LoadLocalData => queue.push(SearchAction::LocalDataLoaded(
                    store
                        .load_bytes(LOCAL_DATA_KEY)
                        .and_then(|b| LocalData::from_bytes(&b)),
                )),
                Effect::SavePastSearches(v) => store.save_string_list(PAST_SEARCHES_KEY, &v),
                Effect::SaveCategories(v) => store.save_string_list(CATEGORIES_KEY, &v),
                Effect::SaveLocalData(d) => {
                    if let Some(bytes) = d.to_bytes() {
                        store.save_bytes(LOCAL_DATA_KEY, &bytes);
                    }
                }
                Effect::FetchCategories => {
                    queue.push(SearchAction::CategoriesFetched(categories()));
                }
                Effect::Search { term, source } => {
                    let result = search(&term);
                    queue.push(SearchAction::FactsFetched {
                        source,
                        term,
                        result,
                    });
                }
            }
        }
    }
}

fn startup(
    engine: &mut SearchEngine,
    store: &MemoryStore,
    search: &dyn Fn(&str) -> Result<Vec<Fact>, ApiFailure>,
    categories: &dyn Fn() -> Result<Vec<String>, ApiFailure>,
) {
    for action in [
        SearchAction::LoadCategories,
        SearchAction::LoadLocalData,
        SearchAction::LoadPastSearches,
    ] {
        drive(engine, store, action, search, categories);
    }
}

#[test]
/// What: A fresh session fetches categories, searches remotely, persists,
/// and a second session restores everything without the network
///
/// - Input: Empty store; scripted 16 categories and one search response;
///   then a restarted engine repeating the same query
/// - Output: First session persists categories, history, and the cache
///   blob; second session samples suggestions from the persisted list and
///   resolves the repeat query purely from cache
fn session_persists_and_restores() {
    let store = MemoryStore::new();
    let full: Vec<String> = (0..16).map(|i| format!("cat{i:02}")).collect();
    let response = vec![fact("0", "a"), fact("1", "b"), fact("2", "c")];

    let category_calls = Cell::new(0usize);
    let search_calls = Cell::new(0usize);
    {
        let mut engine = fixed_engine();
        let search = |_term: &str| -> Result<Vec<Fact>, ApiFailure> {
            search_calls.set(search_calls.get() + 1);
            Ok(response.clone())
        };
        let categories = || -> Result<Vec<String>, ApiFailure> {
            category_calls.set(category_calls.get() + 1);
            Ok(full.clone())
        };
        startup(&mut engine, &store, &search, &categories);
        assert_eq!(category_calls.get(), 1);
        assert_eq!(engine.state.suggestions.len(), 8);

        drive(
            &mut engine,
            &store,
            SearchAction::InputChanged("Chuck".into()),
            &search,
            &categories,
        );
        drive(&mut engine, &store, SearchAction::SubmitInput, &search, &categories);
        assert_eq!(search_calls.get(), 1);
        assert_eq!(engine.state.past_searches, vec!["Chuck".to_string()]);
        assert_eq!(engine.state.input, "");
        assert!(engine.state.results_shown);
    }

    // Durable state is now on "disk".
    assert_eq!(store.load_string_list(CATEGORIES_KEY), full);
    assert_eq!(
        store.load_string_list(PAST_SEARCHES_KEY),
        vec!["Chuck".to_string()]
    );
    let blob = store.load_bytes(LOCAL_DATA_KEY).expect("cache blob persisted");
    let data = LocalData::from_bytes(&blob).expect("cache blob decodes");
    assert_eq!(
        data.terms.get("chuck"),
        Some(&vec!["0".to_string(), "1".to_string(), "2".to_string()])
    );

    // Restarted session: any remote call is a test failure.
    let mut engine = fixed_engine();
    let search = |_term: &str| -> Result<Vec<Fact>, ApiFailure> {
        panic!("cached term must not reach the network")
    };
    let categories =
        || -> Result<Vec<String>, ApiFailure> { panic!("persisted categories must not refetch") };
    startup(&mut engine, &store, &search, &categories);

    assert_eq!(engine.state.suggestions.len(), 8);
    assert_eq!(engine.state.past_searches, vec!["Chuck".to_string()]);
    // The start screen shows a sample of the restored cache.
    assert_eq!(engine.state.results.len(), 3);

    drive(
        &mut engine,
        &store,
        SearchAction::InputChanged("CHUCK".into()),
        &search,
        &categories,
    );
    drive(&mut engine, &store, SearchAction::SubmitInput, &search, &categories);
    assert_eq!(engine.state.results, response);
    assert_eq!(
        store.load_string_list(PAST_SEARCHES_KEY),
        vec!["Chuck".to_string(), "CHUCK".to_string()]
    );
}

#[test]
/// What: A terminal search failure leaves durable state untouched
///
/// - Input: Empty store, scripted ServerBusy failure
/// - Output: Alert pending, no cache blob, no history entry
fn failure_writes_nothing() {
    let store = MemoryStore::new();
    let mut engine = fixed_engine();
    let search = |_term: &str| -> Result<Vec<Fact>, ApiFailure> { Err(ApiFailure::ServerBusy) };
    let categories = || -> Result<Vec<String>, ApiFailure> { Err(ApiFailure::Unknown) };

    startup(&mut engine, &store, &search, &categories);
    drive(
        &mut engine,
        &store,
        SearchAction::InputChanged("S".into()),
        &search,
        &categories,
    );
    drive(&mut engine, &store, SearchAction::SubmitInput, &search, &categories);

    assert!(engine.state.alert.is_some());
    assert!(engine.state.past_searches.is_empty());
    assert_eq!(store.load_bytes(LOCAL_DATA_KEY), None);
    assert!(store.load_string_list(PAST_SEARCHES_KEY).is_empty());
    // Typed input survives for a retry by hand.
    assert_eq!(engine.state.input, "S");
}
