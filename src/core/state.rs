use serde::{Deserialize, Serialize};

use crate::models::{SearchQuery, Station};

/// Transitions accepted by [`SearchState::reduce`]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    /// A search was issued; previous results stay visible while it runs
    Start(SearchQuery),
    /// The latest search resolved; its stations replace the current set
    Success(Vec<Station>),
    /// The latest search failed; the current set is cleared
    Error(String),
    /// Back to the initial empty state
    Clear,
    /// Override only the loading flag
    SetLoading(bool),
}

/// The single result set shown to the presentation layer
///
/// Every transition is total: any action is legal in any state, and the
/// reducer never looks at `loading`. Ordering of overlapping searches is the
/// controller's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub stations: Vec<Station>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_query: Option<SearchQuery>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action, producing the next state
    pub fn reduce(self, action: SearchAction) -> SearchState {
        match action {
            SearchAction::Start(query) => SearchState {
                loading: true,
                error: None,
                last_query: Some(query),
                ..self
            },
            SearchAction::Success(stations) => SearchState {
                loading: false,
                error: None,
                stations,
                ..self
            },
            SearchAction::Error(message) => SearchState {
                loading: false,
                error: Some(message),
                stations: Vec::new(),
                ..self
            },
            SearchAction::Clear => SearchState::default(),
            SearchAction::SetLoading(loading) => SearchState { loading, ..self },
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
