//! Search engine state machine.
//!
//! All session mutation happens in [`SearchEngine::apply`], a pure
//! transition from one action to a list of effects. Wall-clock randomness
//! enters only through the injected seed sources, so transitions are fully
//! reproducible in tests.

use tracing::debug;

use crate::state::{Effect, Fact, QuerySource, SearchAction, SearchState};
use crate::suggest::{self, SeedSource};

/// One search session: the state value plus its seed capabilities.
pub struct SearchEngine {
    /// Session state, owned exclusively by this engine.
    pub state: SearchState,
    suggestion_seed: SeedSource,
    facts_seed: SeedSource,
}

impl SearchEngine {
    /// Build an engine with explicit seed sources (tests inject fixed ones).
    #[must_use]
    pub fn new(suggestion_seed: SeedSource, facts_seed: SeedSource) -> Self {
        Self {
            state: SearchState::default(),
            suggestion_seed,
            facts_seed,
        }
    }

    /// Production engine: both samplers independently seeded from the
    /// wall clock at each call.
    #[must_use]
    pub fn with_epoch_seeds() -> Self {
        Self::new(Box::new(suggest::epoch_seed), Box::new(suggest::epoch_seed))
    }

    /// What: Advance the session by one action.
    ///
    /// Inputs:
    /// - `action`: User intent or effect completion
    ///
    /// Output:
    /// - Effects for the runtime to execute, in order. Persistence saves
    ///   always precede any further completions they must outlive.
    pub fn apply(&mut self, action: SearchAction) -> Vec<Effect> {
        match action {
            SearchAction::LoadPastSearches => vec![Effect::LoadPastSearches],
            SearchAction::LoadCategories => vec![Effect::LoadCategories],
            SearchAction::LoadLocalData => vec![Effect::LoadLocalData],
            SearchAction::InputChanged(value) => {
                self.state.input = value;
                Vec::new()
            }
            SearchAction::SubmitInput => {
                let term = self.state.input.clone();
                self.resolve(term, QuerySource::Manual)
            }
            SearchAction::SuggestionChosen(index) => {
                match self.state.suggestions.get(index).cloned() {
                    Some(category) => self.resolve(category, QuerySource::Suggestion),
                    None => {
                        debug!(index, "[Engine] Suggestion index out of range, ignoring");
                        Vec::new()
                    }
                }
            }
            SearchAction::PastSearchChosen(index) => {
                match self.state.past_searches.get(index).cloned() {
                    Some(term) => self.resolve(term, QuerySource::History),
                    None => {
                        debug!(index, "[Engine] Past-search index out of range, ignoring");
                        Vec::new()
                    }
                }
            }
            SearchAction::AlertDismissed => {
                self.state.alert = None;
                Vec::new()
            }
            SearchAction::PastSearchesLoaded(terms) => {
                self.state.past_searches = terms;
                Vec::new()
            }
            SearchAction::CategoriesLoaded(categories) => {
                if categories.is_empty() {
                    return vec![Effect::FetchCategories];
                }
                self.state.suggestions =
                    suggest::sample_suggestions(&categories, (self.suggestion_seed)());
                Vec::new()
            }
            SearchAction::CategoriesFetched(Ok(categories)) => {
                self.state.suggestions =
                    suggest::sample_suggestions(&categories, (self.suggestion_seed)());
                vec![Effect::SaveCategories(categories)]
            }
            SearchAction::CategoriesFetched(Err(failure)) => {
                // Suggestions are a convenience; this load fails silently.
                debug!(%failure, "[Engine] Category fetch failed");
                Vec::new()
            }
            SearchAction::LocalDataLoaded(Some(data)) => {
                self.state.local = data;
                // Results already on screen take precedence over the
                // start-screen sample if the load completes late.
                if !self.state.results_shown {
                    self.state.results = suggest::sample_default_facts(
                        self.state.local.facts.values(),
                        (self.facts_seed)(),
                    );
                }
                Vec::new()
            }
            SearchAction::LocalDataLoaded(None) => Vec::new(),
            SearchAction::FactsFetched {
                source,
                term,
                result: Ok(facts),
            } => {
                let normalized = term.to_lowercase();
                self.state.local.merge(&normalized, &facts);
                let mut effects = vec![Effect::SaveLocalData(self.state.local.clone())];
                self.finish_success(source, &term, facts, &mut effects);
                effects
            }
            SearchAction::FactsFetched {
                result: Err(failure),
                ..
            } => {
                self.state.loading = false;
                self.state.alert = Some(failure.to_string());
                Vec::new()
            }
        }
    }

    /// What: Resolve a term, cache first.
    ///
    /// Inputs:
    /// - `term`: As submitted, casing preserved
    /// - `source`: Affordance that triggered resolution
    ///
    /// Output:
    /// - Cache hit: success effects immediately, no network.
    /// - Miss: a single `Search` effect; the completion arrives later as
    ///   `FactsFetched`.
    fn resolve(&mut self, term: String, source: QuerySource) -> Vec<Effect> {
        if term.trim().is_empty() {
            debug!("[Engine] Ignoring empty search term");
            return Vec::new();
        }
        let normalized = term.to_lowercase();
        if let Some(facts) = self.state.local.resolve(&normalized) {
            debug!(term = %normalized, count = facts.len(), "[Engine] Cache hit, skipping network");
            let mut effects = Vec::new();
            self.finish_success(source, &term, facts, &mut effects);
            return effects;
        }
        self.state.loading = true;
        vec![Effect::Search { term, source }]
    }

    /// Shared success tail for the cache-hit and network paths.
    ///
    /// Only manual entry touches history: the original typed term is
    /// appended (repeats allowed) and the input field cleared.
    fn finish_success(
        &mut self,
        source: QuerySource,
        term: &str,
        facts: Vec<Fact>,
        effects: &mut Vec<Effect>,
    ) {
        if source == QuerySource::Manual {
            self.state.past_searches.push(term.to_string());
            self.state.input.clear();
            effects.push(Effect::SavePastSearches(self.state.past_searches.clone()));
        }
        self.state.loading = false;
        self.state.results = facts;
        self.state.results_shown = true;
    }
}
