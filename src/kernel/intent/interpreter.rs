use once_cell::sync::Lazy;
use regex::Regex;

use super::types::Intent;

/// Query extractors, tried in order against the original-case command.
static QUERY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)search for (.+)", r"(?i)find (.+)", r"(?i)look for (.+)"]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Ordinal/cardinal words in fixed priority order. First substring hit wins.
const NUMBER_WORDS: [(&str, usize); 10] = [
    ("one", 1),
    ("first", 1),
    ("two", 2),
    ("second", 2),
    ("three", 3),
    ("third", 3),
    ("four", 4),
    ("fourth", 4),
    ("five", 5),
    ("fifth", 5),
];

/// Maps a raw utterance to exactly one intent. Total: never fails.
///
/// heuristics, first match wins:
/// - "search for" / "find" -> Search
/// - "select result" / "open result" -> SelectResult
/// - "add result" / "save result" -> SaveResult
/// - "clear results" / "reset" -> ClearResults
/// - anything else -> SearchLiteral
pub fn classify(utterance: &str) -> Intent {
    let lower = utterance.to_lowercase();

    if lower.contains("search for") || lower.contains("find") {
        Intent::Search(extract_search_query(utterance))
    } else if lower.contains("select result") || lower.contains("open result") {
        Intent::SelectResult(extract_number(&lower))
    } else if lower.contains("add result") || lower.contains("save result") {
        Intent::SaveResult(extract_number(&lower))
    } else if lower.contains("clear results") || lower.contains("reset") {
        Intent::ClearResults
    } else {
        Intent::SearchLiteral(utterance.to_string())
    }
}

/// First capture group of the first matching pattern, or the whole command.
pub fn extract_search_query(command: &str) -> String {
    QUERY_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(command))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| command.to_string())
}

/// 1-based index named in a command. Defaults to 1 when nothing is named.
pub fn extract_number(command: &str) -> usize {
    let lower = command.to_lowercase();

    if let Some((_, n)) = NUMBER_WORDS.iter().find(|(word, _)| lower.contains(word)) {
        return *n;
    }

    let digits: String = lower
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return 1;
    }

    // Overflow saturates, which the executor then rejects as out of range.
    digits.parse().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_for_only_applies_inside_search_commands() {
        assert_eq!(
            classify("find me a look for ducks"),
            Intent::Search("me a look for ducks".to_string())
        );
        assert_eq!(
            classify("look for ducks"),
            Intent::SearchLiteral("look for ducks".to_string())
        );
    }

    #[test]
    fn containment_without_pattern_match_keeps_whole_command() {
        assert_eq!(classify("Find"), Intent::Search("Find".to_string()));
    }
}
