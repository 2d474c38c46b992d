use serde::{Deserialize, Serialize};

/// Result of classifying one utterance. Indices are 1-based and unchecked;
/// the executor validates them against the current result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Search(String),
    SelectResult(usize),
    SaveResult(usize),
    ClearResults,
    /// No keyword matched: the whole utterance is the query.
    SearchLiteral(String),
}

impl Intent {
    /// Query string for either search variant.
    pub fn query(&self) -> Option<&str> {
        match self {
            Intent::Search(q) | Intent::SearchLiteral(q) => Some(q),
            _ => None,
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Search(_) => IntentKind::Search,
            Intent::SelectResult(_) => IntentKind::SelectResult,
            Intent::SaveResult(_) => IntentKind::SaveResult,
            Intent::ClearResults => IntentKind::ClearResults,
            Intent::SearchLiteral(_) => IntentKind::SearchLiteral,
        }
    }
}

/// Content-free tag of an intent, safe for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    Search,
    SelectResult,
    SaveResult,
    ClearResults,
    SearchLiteral,
}
