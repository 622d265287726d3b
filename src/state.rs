//! Core value types shared by the engine, the API client, and the frontend.

use crate::api::ApiFailure;
use crate::cache::LocalData;

/// One content record returned by the facts API.
///
/// Immutable once fetched; the `id` is globally unique and stable across
/// sessions, so it doubles as the cache key in [`LocalData`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fact {
    /// Icon image URL supplied by the API.
    pub icon_url: String,
    /// Globally unique, stable identifier.
    pub id: String,
    /// Canonical source URL for the fact.
    pub url: String,
    /// Display text.
    pub value: String,
    /// Category tags; may be empty.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Synthetic tag shown for facts without any category of their own.
pub const UNCATEGORIZED_TAG: &str = "uncategorized";

impl Fact {
    /// Categories for display grouping: the stored tags, or a single
    /// synthetic [`UNCATEGORIZED_TAG`] when the fact has none.
    #[must_use]
    pub fn display_categories(&self) -> Vec<String> {
        if self.categories.is_empty() {
            vec![UNCATEGORIZED_TAG.to_string()]
        } else {
            self.categories.clone()
        }
    }
}

/// Which affordance triggered a search resolution.
///
/// Governs the history policy: only manually typed terms are appended to
/// the past-search list on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuerySource {
    /// Term typed into the search field and submitted.
    Manual,
    /// Term picked from the suggestion chips.
    Suggestion,
    /// Term re-selected from the past-search list.
    History,
}

/// Inputs to the search engine's transition function.
///
/// User intents and effect completions arrive through the same sequential
/// action stream; the engine never observes an effect result any other way.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchAction {
    /// Startup: read the persisted past-search list.
    LoadPastSearches,
    /// Startup: read the persisted category list.
    LoadCategories,
    /// Startup: read the persisted cache blob.
    LoadLocalData,
    /// The typed search term changed.
    InputChanged(String),
    /// The typed term was submitted.
    SubmitInput,
    /// A suggestion chip at the given display index was chosen.
    SuggestionChosen(usize),
    /// A past search at the given display index was re-selected.
    PastSearchChosen(usize),
    /// The pending failure notice was dismissed.
    AlertDismissed,
    /// Completion of [`SearchAction::LoadPastSearches`].
    PastSearchesLoaded(Vec<String>),
    /// Completion of [`SearchAction::LoadCategories`]; empty when nothing
    /// was persisted yet.
    CategoriesLoaded(Vec<String>),
    /// Completion of a remote category fetch.
    CategoriesFetched(Result<Vec<String>, ApiFailure>),
    /// Completion of [`SearchAction::LoadLocalData`]; `None` when no blob
    /// exists or it failed to decode.
    LocalDataLoaded(Option<LocalData>),
    /// Terminal outcome of a remote search, after any client-side retries.
    FactsFetched {
        /// Affordance that triggered the search.
        source: QuerySource,
        /// Term as originally submitted (casing preserved).
        term: String,
        /// Facts in remote relevance order, or the last failure.
        result: Result<Vec<Fact>, ApiFailure>,
    },
}

/// Side effects requested by a transition, executed by the runtime.
///
/// Loads deliver exactly one completion action back into the stream; saves
/// deliver none (fire and forget).
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Read the persisted past-search list.
    LoadPastSearches,
    /// Read the persisted category list.
    LoadCategories,
    /// Read the persisted cache blob.
    LoadLocalData,
    /// Persist the full past-search list.
    SavePastSearches(Vec<String>),
    /// Persist the full category list.
    SaveCategories(Vec<String>),
    /// Persist the whole cache blob.
    SaveLocalData(LocalData),
    /// Fetch the category list from the remote API.
    FetchCategories,
    /// Run a remote search (the client applies its own retry ladder).
    Search {
        /// Term as submitted (casing preserved).
        term: String,
        /// Affordance that triggered the search.
        source: QuerySource,
    },
}

/// Per-session search state, owned by one engine instance.
///
/// Created empty per screen session and discarded with it; only its durable
/// constituents (past searches, `local`) are ever persisted.
#[derive(Debug, Default)]
pub struct SearchState {
    /// Current typed term, casing preserved.
    pub input: String,
    /// Whether a results view is currently presented.
    pub results_shown: bool,
    /// Previously executed manual search terms, most-recent-last. Repeats
    /// are allowed; this is an append-only log, not a set.
    pub past_searches: Vec<String>,
    /// Bounded, alphabetically sorted suggestion sample.
    pub suggestions: Vec<String>,
    /// Term-to-facts cache, merged additively over the session.
    pub local: LocalData,
    /// Facts currently displayed (search results or the default sample).
    pub results: Vec<Fact>,
    /// Pending failure notice for the frontend; cleared on dismissal.
    pub alert: Option<String>,
    /// Whether a remote search is outstanding.
    pub loading: bool,
}
