use crate::kernel::voice::DowngradeCause;

/// Everything the system can tell the user, before it becomes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ReadyToListen,
    TextInterface,
    Listening,
    Heard(String),
    EmptyQuery,
    Searching(String),
    Found(usize),
    SearchFailed,
    SearchNetworkError,
    InvalidSelection { available: usize },
    InvalidSave,
    Opening(String),
    NowReading(String),
    ContentFailed,
    ContentError,
    AlreadySaved(String),
    Saved(String),
    Cleared,
    Stopped,
    ReadyForNext,
    VoiceFallback(DowngradeCause),
}

/// PURE FUNCTION: Converts a notice into the sentence shown and spoken.
pub fn realize(notice: &Notice) -> String {
    match notice {
        Notice::ReadyToListen => "Ready to search. Speak your query".to_string(),
        Notice::TextInterface => "Using text-based search interface.".to_string(),
        Notice::Listening => "Listening...".to_string(),
        Notice::Heard(utterance) => format!("You said: \"{}\"", utterance),
        Notice::EmptyQuery => "Please enter a search query.".to_string(),
        Notice::Searching(query) => format!("Searching for \"{}\"", query),
        Notice::Found(count) => format!(
            "Found {} results. Say \"select result 1\" to view the first one.",
            count
        ),
        Notice::SearchFailed => "Search failed. Please try again.".to_string(),
        Notice::SearchNetworkError => "Network error. Please check your connection.".to_string(),
        Notice::InvalidSelection { available } => format!(
            "Invalid result number. Try saying 'select result 1' through 'select result {}'",
            available
        ),
        Notice::InvalidSave => "Invalid result number. Please try again.".to_string(),
        Notice::Opening(title) => format!("Opening \"{}\"...", title),
        Notice::NowReading(title) => format!("Now reading \"{}\"", title),
        Notice::ContentFailed => "Failed to load content.".to_string(),
        Notice::ContentError => "Error loading content.".to_string(),
        Notice::AlreadySaved(title) => format!("\"{}\" is already saved", title),
        Notice::Saved(title) => format!("Saved \"{}\" to your collection", title),
        Notice::Cleared => "Results cleared - ready for new search".to_string(),
        Notice::Stopped => "Audio stopped. Ready for next command.".to_string(),
        Notice::ReadyForNext => "Ready for your next command".to_string(),
        Notice::VoiceFallback(cause) => match cause {
            DowngradeCause::PermissionDenied => {
                "Microphone access denied. Using text input instead.".to_string()
            }
            DowngradeCause::StartFailure => "Voice recognition error. Using text input.".to_string(),
            DowngradeCause::NoSpeech => "No speech detected. Using text input instead.".to_string(),
            DowngradeCause::RecognitionError => {
                "Voice recognition unavailable. Using text input instead.".to_string()
            }
        },
    }
}

/// Spoken form of the acknowledgment (no quotes, they read badly).
pub fn acknowledgment(utterance: &str) -> String {
    format!("You said: {}", utterance)
}

pub const LISTENING_CUE: &str = "Listening";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_mentions_count() {
        assert!(realize(&Notice::Found(2)).contains('2'));
    }

    #[test]
    fn invalid_selection_names_range() {
        let text = realize(&Notice::InvalidSelection { available: 4 });
        assert!(text.ends_with("'select result 4'"));
    }
}
