use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One hit from the search service. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub snippet: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A successful search response, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    /// Informational note from the service (e.g. "no results found").
    #[serde(default)]
    pub message: Option<String>,
}

/// Fetched body of an opened result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Strict session delta. This is the ONLY way session state mutates.
#[derive(Debug, Clone)]
pub enum SessionDelta {
    ResultsReplaced {
        query: String,
        results: Vec<SearchResult>,
    },
    /// 1-based position into the current results.
    Selected(usize),
    Saved(SearchResult),
    Cleared,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current_query: String,
    results: Vec<SearchResult>,
    saved: Vec<SearchResult>,
    saved_ids: HashSet<String>,
    selected_index: Option<usize>,
    /// Monotonic version, bumped on every reduction.
    pub version: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: SessionDelta) {
        self.version += 1;

        match delta {
            SessionDelta::ResultsReplaced { query, results } => {
                // Positions from the previous set mean nothing now.
                self.current_query = query;
                self.results = results;
                self.selected_index = None;
            }
            SessionDelta::Selected(index) => {
                self.selected_index = Some(index);
            }
            SessionDelta::Saved(result) => {
                if self.saved_ids.insert(result.id.clone()) {
                    self.saved.push(result);
                }
            }
            SessionDelta::Cleared => {
                // The saved collection survives a clear.
                self.current_query.clear();
                self.results.clear();
                self.selected_index = None;
            }
        }
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn saved(&self) -> &[SearchResult] {
        &self.saved
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Result at a 1-based position, if in range.
    pub fn result(&self, index: usize) -> Option<&SearchResult> {
        index.checked_sub(1).and_then(|i| self.results.get(i))
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_ids.contains(id)
    }
}
