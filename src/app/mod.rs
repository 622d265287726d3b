//! Channel-driven runtime tying the engine to its effect clients and the
//! terminal frontend.
//!
//! One loop owns the session state and drains a single action channel, so
//! every mutation is sequential. Remote calls and persistence loads run as
//! spawned tasks that deliver exactly one completion action back into the
//! channel; persistence saves deliver none and are only awaited at
//! shutdown.

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::info;

use crate::api::{FactsApi, search_with_retry};
use crate::cache::LocalData;
use crate::engine::SearchEngine;
use crate::state::{Effect, Fact, SearchAction};
use crate::storage::{CATEGORIES_KEY, KvStore, LOCAL_DATA_KEY, PAST_SEARCHES_KEY};

/// Engine plus effect clients and the action channel feeding it.
pub struct Runtime<A: FactsApi> {
    engine: SearchEngine,
    api: Arc<A>,
    store: Arc<dyn KvStore>,
    actions_tx: mpsc::UnboundedSender<SearchAction>,
    actions_rx: Option<mpsc::UnboundedReceiver<SearchAction>>,
    pending_saves: Vec<tokio::task::JoinHandle<()>>,
}

impl<A: FactsApi> Runtime<A> {
    /// Wire an engine to its clients.
    #[must_use]
    pub fn new(engine: SearchEngine, api: A, store: Arc<dyn KvStore>) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            api: Arc::new(api),
            store,
            actions_tx,
            actions_rx: Some(actions_rx),
            pending_saves: Vec::new(),
        }
    }

    /// Apply one action and execute every effect it requested.
    fn handle(&mut self, action: SearchAction) {
        for effect in self.engine.apply(action) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::LoadPastSearches => {
                self.load_list(PAST_SEARCHES_KEY, SearchAction::PastSearchesLoaded);
            }
            Effect::LoadCategories => {
                self.load_list(CATEGORIES_KEY, SearchAction::CategoriesLoaded);
            }
            Effect::LoadLocalData => {
                let store = Arc::clone(&self.store);
                let tx = self.actions_tx.clone();
                tokio::task::spawn_blocking(move || {
                    let data = store
                        .load_bytes(LOCAL_DATA_KEY)
                        .and_then(|bytes| LocalData::from_bytes(&bytes));
                    let _ = tx.send(SearchAction::LocalDataLoaded(data));
                });
            }
            Effect::SavePastSearches(values) => self.save_list(PAST_SEARCHES_KEY, values),
            Effect::SaveCategories(values) => self.save_list(CATEGORIES_KEY, values),
            Effect::SaveLocalData(data) => {
                let Some(bytes) = data.to_bytes() else { return };
                let store = Arc::clone(&self.store);
                self.pending_saves.push(tokio::task::spawn_blocking(move || {
                    store.save_bytes(LOCAL_DATA_KEY, &bytes);
                }));
            }
            Effect::FetchCategories => {
                let api = Arc::clone(&self.api);
                let tx = self.actions_tx.clone();
                tokio::spawn(async move {
                    let result = api.list_categories().await;
                    let _ = tx.send(SearchAction::CategoriesFetched(result));
                });
            }
            Effect::Search { term, source } => {
                let api = Arc::clone(&self.api);
                let tx = self.actions_tx.clone();
                tokio::spawn(async move {
                    let result = search_with_retry(api.as_ref(), &term).await;
                    let _ = tx.send(SearchAction::FactsFetched {
                        source,
                        term,
                        result,
                    });
                });
            }
        }
    }

    fn load_list(&self, key: &'static str, wrap: fn(Vec<String>) -> SearchAction) {
        let store = Arc::clone(&self.store);
        let tx = self.actions_tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(wrap(store.load_string_list(key)));
        });
    }

    fn save_list(&mut self, key: &'static str, values: Vec<String>) {
        let store = Arc::clone(&self.store);
        self.pending_saves.push(tokio::task::spawn_blocking(move || {
            store.save_string_list(key, &values);
        }));
    }

    /// Wait for every outstanding persistence write before returning.
    async fn flush_saves(&mut self) {
        for handle in self.pending_saves.drain(..) {
            let _ = handle.await;
        }
    }

    /// What: Run a single query to completion and print the outcome.
    ///
    /// Inputs:
    /// - `query`: Term submitted as a manual entry
    ///
    /// Output:
    /// - `true` when results were shown, `false` on a terminal failure.
    ///
    /// Details:
    /// - Durable state is loaded before submitting, so a cached term never
    ///   hits the network and the history append extends the persisted
    ///   list instead of clobbering it.
    pub async fn run_once(mut self, query: String) -> bool {
        let Some(mut rx) = self.actions_rx.take() else {
            return false;
        };
        self.handle(SearchAction::LoadPastSearches);
        self.handle(SearchAction::LoadLocalData);
        let (mut past_loaded, mut local_loaded) = (false, false);
        while !(past_loaded && local_loaded) {
            let Some(action) = rx.recv().await else {
                return false;
            };
            match &action {
                SearchAction::PastSearchesLoaded(_) => past_loaded = true,
                SearchAction::LocalDataLoaded(_) => local_loaded = true,
                _ => {}
            }
            self.handle(action);
        }

        self.handle(SearchAction::InputChanged(query));
        self.handle(SearchAction::SubmitInput);
        while !self.engine.state.results_shown && self.engine.state.alert.is_none() {
            let Some(action) = rx.recv().await else {
                break;
            };
            self.handle(action);
        }

        let ok = if let Some(alert) = self.engine.state.alert.clone() {
            eprintln!("search failed: {alert}");
            false
        } else {
            render_results(&self.engine.state.results);
            true
        };
        self.flush_saves().await;
        ok
    }

    /// What: Run the interactive prompt until quit or end of input.
    ///
    /// Details:
    /// - `#N` picks suggestion N, `!N` re-runs past search N, `history`
    ///   lists past searches, `q` quits; anything else is submitted as a
    ///   manual search.
    pub async fn run_interactive(mut self) {
        let Some(mut rx) = self.actions_rx.take() else {
            return;
        };
        self.handle(SearchAction::LoadCategories);
        self.handle(SearchAction::LoadLocalData);
        self.handle(SearchAction::LoadPastSearches);
        let (mut past_loaded, mut local_loaded) = (false, false);
        while !(past_loaded && local_loaded) {
            let Some(action) = rx.recv().await else {
                return;
            };
            match &action {
                SearchAction::PastSearchesLoaded(_) => past_loaded = true,
                SearchAction::LocalDataLoaded(_) => local_loaded = true,
                _ => {}
            }
            self.handle(action);
        }

        println!("factstash: type a term to search, #N for a suggestion, !N for a past search,");
        println!("'history' to list past searches, 'q' to quit.");
        if !self.engine.state.results.is_empty() {
            println!();
            render_results(&self.engine.state.results);
        }
        let mut rendered = self.engine.state.results.clone();
        let mut shown_suggestions = Vec::new();

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                maybe_action = rx.recv() => {
                    let Some(action) = maybe_action else { break };
                    self.handle(action);
                }
                line = lines.next_line() => {
                    match line {
                        Ok(Some(text)) => {
                            if !self.handle_line(text.trim()) {
                                break;
                            }
                        }
                        _ => break,
                    }
                }
            }

            if self.engine.state.suggestions != shown_suggestions {
                shown_suggestions = self.engine.state.suggestions.clone();
                render_suggestions(&shown_suggestions);
            }
            if let Some(alert) = self.engine.state.alert.clone() {
                eprintln!("search failed: {alert}");
                self.handle(SearchAction::AlertDismissed);
            }
            if self.engine.state.results_shown && self.engine.state.results != rendered {
                rendered = self.engine.state.results.clone();
                render_results(&rendered);
            }
        }
        info!("interactive session ended");
        self.flush_saves().await;
    }

    /// Translate one prompt line into actions; `false` means quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match line {
            "" => {}
            "q" | "quit" | "exit" => return false,
            "history" => render_history(&self.engine.state.past_searches),
            _ => {
                if let Some(rest) = line.strip_prefix('#') {
                    if let Some(index) = parse_index(rest) {
                        self.handle(SearchAction::SuggestionChosen(index));
                    } else {
                        eprintln!("expected a suggestion number, e.g. #1");
                    }
                } else if let Some(rest) = line.strip_prefix('!') {
                    if let Some(index) = parse_index(rest) {
                        self.handle(SearchAction::PastSearchChosen(index));
                    } else {
                        eprintln!("expected a past-search number, e.g. !1");
                    }
                } else {
                    self.handle(SearchAction::InputChanged(line.to_string()));
                    self.handle(SearchAction::SubmitInput);
                }
            }
        }
        true
    }
}

/// Parse a 1-based display index into a 0-based list index.
fn parse_index(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn render_results(facts: &[Fact]) {
    if facts.is_empty() {
        println!("No facts found.");
        return;
    }
    for (i, fact) in facts.iter().enumerate() {
        println!(
            "{:>2}. [{}] {}",
            i + 1,
            fact.display_categories().join(", "),
            fact.value
        );
    }
}

fn render_suggestions(suggestions: &[String]) {
    if suggestions.is_empty() {
        return;
    }
    let chips: Vec<String> = suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("#{} {s}", i + 1))
        .collect();
    println!("suggestions: {}", chips.join("  "));
}

fn render_history(past_searches: &[String]) {
    if past_searches.is_empty() {
        println!("No past searches yet.");
        return;
    }
    for (i, term) in past_searches.iter().enumerate() {
        println!("!{} {term}", i + 1);
    }
}
