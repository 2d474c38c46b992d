use visifind::kernel::event::RequestFailure;
use visifind::kernel::executor::{Execution, IntentExecutor, Request, Response};
use visifind::kernel::intent::Intent;
use visifind::kernel::scheduler::DisplayUpdate;
use visifind::kernel::state::{Content, SearchPage, SearchResult, SessionDelta, SessionState};
use visifind::outputs::realizer::{realize, Notice};

fn hit(id: &str, title: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        title: title.to_string(),
        snippet: format!("All about {}", title),
        url: Some(format!("https://example.org/{}", id)),
    }
}

fn seeded(n: usize) -> SessionState {
    let mut session = SessionState::new();
    let results = (1..=n).map(|i| hit(&format!("id{}", i), &format!("Result {}", i))).collect();
    session.reduce(SessionDelta::ResultsReplaced { query: "seed".to_string(), results });
    session
}

/// Runs a network-backed intent to completion with a canned response.
fn run_with(session: &mut SessionState, intent: Intent, response: Response) -> Notice {
    match IntentExecutor::execute(session, intent) {
        Execution::Awaiting { request, .. } => IntentExecutor::complete(session, request, response).notice,
        Execution::Finished(outcome) => outcome.notice,
    }
}

#[test]
fn test_empty_query_never_reaches_the_network() {
    let mut session = SessionState::new();
    for intent in [Intent::Search("   ".to_string()), Intent::SearchLiteral(String::new())] {
        match IntentExecutor::execute(&mut session, intent) {
            Execution::Finished(outcome) => assert_eq!(outcome.notice, Notice::EmptyQuery),
            other => panic!("expected no request, got {:?}", other),
        }
    }
    assert_eq!(session.version, 0);
}

#[test]
fn test_search_issues_one_trimmed_request() {
    let mut session = SessionState::new();
    match IntentExecutor::execute(&mut session, Intent::SearchLiteral("  red pandas ".to_string())) {
        Execution::Awaiting { request, notice, .. } => {
            assert_eq!(request, Request::Search { query: "red pandas".to_string() });
            assert_eq!(notice, Notice::Searching("red pandas".to_string()));
        }
        other => panic!("expected a search request, got {:?}", other),
    }
    // Nothing changes until the response arrives.
    assert!(session.results().is_empty());
    assert_eq!(session.current_query(), "");
}

#[test]
fn test_successful_search_replaces_results_wholesale() {
    let mut session = seeded(5);
    session.reduce(SessionDelta::Selected(4));

    let page = SearchPage { results: vec![hit("p1", "Giant panda"), hit("p2", "Red panda")], message: None };
    let notice = run_with(&mut session, Intent::Search("pandas".to_string()), Response::Search(Ok(page)));

    assert_eq!(notice, Notice::Found(2));
    assert!(realize(&notice).contains('2'));
    assert_eq!(session.current_query(), "pandas");
    let ids: Vec<_> = session.results().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p2"]);
    assert_eq!(session.selected_index(), None, "old selection points into a dead result set");
}

#[test]
fn test_failed_search_leaves_state_untouched() {
    let mut session = seeded(3);
    let before = session.version;

    let notice = run_with(
        &mut session,
        Intent::Search("otters".to_string()),
        Response::Search(Err(RequestFailure::Network("connection refused".to_string()))),
    );
    assert_eq!(notice, Notice::SearchNetworkError);

    let notice = run_with(
        &mut session,
        Intent::Search("otters".to_string()),
        Response::Search(Err(RequestFailure::Rejected("Search service unavailable".to_string()))),
    );
    assert_eq!(notice, Notice::SearchFailed);

    assert_eq!(session.version, before);
    assert_eq!(session.results().len(), 3);
    assert_eq!(session.current_query(), "seed");
}

#[test]
fn test_select_out_of_range_keeps_selection() {
    let mut session = seeded(3);
    session.reduce(SessionDelta::Selected(2));

    for index in [0, 4] {
        match IntentExecutor::execute(&mut session, Intent::SelectResult(index)) {
            Execution::Finished(outcome) => {
                assert_eq!(outcome.notice, Notice::InvalidSelection { available: 3 })
            }
            other => panic!("index {} should be rejected, got {:?}", index, other),
        }
        assert_eq!(session.selected_index(), Some(2));
    }
}

#[test]
fn test_select_on_empty_results_issues_no_request() {
    let mut session = SessionState::new();
    match IntentExecutor::execute(&mut session, Intent::SelectResult(1)) {
        Execution::Finished(outcome) => {
            assert_eq!(outcome.notice, Notice::InvalidSelection { available: 0 })
        }
        other => panic!("expected invalid-index feedback, got {:?}", other),
    }
    assert_eq!(session.selected_index(), None);
}

#[test]
fn test_select_fetches_content_and_reads_it() {
    let mut session = seeded(3);

    let execution = IntentExecutor::execute(&mut session, Intent::SelectResult(2));
    let Execution::Awaiting { request, notice, display } = execution else {
        panic!("expected a content request");
    };
    assert_eq!(
        request,
        Request::Content { result_id: "id2".to_string(), title: "Result 2".to_string() }
    );
    assert_eq!(notice, Notice::Opening("Result 2".to_string()));
    assert_eq!(display, vec![DisplayUpdate::Selected(2)]);
    assert_eq!(session.selected_index(), Some(2));

    let content = Content {
        title: "Result 2".to_string(),
        content: "The full article body.".to_string(),
        url: None,
    };
    let outcome = IntentExecutor::complete(&mut session, request, Response::Content(Ok(content.clone())));
    assert_eq!(outcome.notice, Notice::NowReading("Result 2".to_string()));
    assert_eq!(outcome.read_aloud.as_deref(), Some("The full article body."));
    assert_eq!(outcome.display, vec![DisplayUpdate::Content(content)]);
}

#[test]
fn test_content_failure_keeps_selection_without_content() {
    let mut session = seeded(2);
    let Execution::Awaiting { request, .. } = IntentExecutor::execute(&mut session, Intent::SelectResult(1)) else {
        panic!("expected a content request");
    };

    let outcome = IntentExecutor::complete(
        &mut session,
        request.clone(),
        Response::Content(Err(RequestFailure::Rejected("Content not found".to_string()))),
    );
    assert_eq!(outcome.notice, Notice::ContentFailed);
    assert!(outcome.read_aloud.is_none());
    assert!(outcome.display.is_empty());
    assert_eq!(session.selected_index(), Some(1));

    let outcome = IntentExecutor::complete(
        &mut session,
        request,
        Response::Content(Err(RequestFailure::Network("timeout".to_string()))),
    );
    assert_eq!(outcome.notice, Notice::ContentError);
}

#[test]
fn test_save_is_idempotent() {
    let mut session = seeded(3);

    let first = run_with(&mut session, Intent::SaveResult(2), Response::Search(Ok(SearchPage::default())));
    assert_eq!(first, Notice::Saved("Result 2".to_string()));

    let second = IntentExecutor::execute(&mut session, Intent::SaveResult(2));
    match second {
        Execution::Finished(outcome) => {
            assert_eq!(outcome.notice, Notice::AlreadySaved("Result 2".to_string()));
            assert_eq!(realize(&outcome.notice), "\"Result 2\" is already saved");
        }
        other => panic!("save should finish locally, got {:?}", other),
    }

    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].id, "id2");
}

#[test]
fn test_save_out_of_range() {
    let mut session = seeded(1);
    for index in [0, 2] {
        match IntentExecutor::execute(&mut session, Intent::SaveResult(index)) {
            Execution::Finished(outcome) => assert_eq!(outcome.notice, Notice::InvalidSave),
            other => panic!("expected invalid index, got {:?}", other),
        }
    }
    assert!(session.saved().is_empty());
}

#[test]
fn test_saved_collection_keeps_insertion_order() {
    let mut session = seeded(4);
    for index in [3, 1, 4, 1] {
        let _ = IntentExecutor::execute(&mut session, Intent::SaveResult(index));
    }
    let ids: Vec<_> = session.saved().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["id3", "id1", "id4"]);
}

#[test]
fn test_pandas_save_clear_regression() {
    let mut session = SessionState::new();

    let page = SearchPage { results: vec![hit("p1", "Giant panda"), hit("p2", "Red panda")], message: None };
    let notice = run_with(&mut session, Intent::Search("pandas".to_string()), Response::Search(Ok(page)));
    assert!(realize(&notice).contains('2'));
    assert_eq!(session.results().len(), 2);

    let _ = IntentExecutor::execute(&mut session, Intent::SaveResult(2));
    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].id, "p2");

    match IntentExecutor::execute(&mut session, Intent::ClearResults) {
        Execution::Finished(outcome) => {
            assert_eq!(outcome.notice, Notice::Cleared);
            assert_eq!(outcome.display, vec![DisplayUpdate::Cleared]);
        }
        other => panic!("clear should finish locally, got {:?}", other),
    }

    assert!(session.results().is_empty());
    assert_eq!(session.current_query(), "");
    assert_eq!(session.selected_index(), None);
    // Current behaviour: the saved collection survives a clear.
    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].id, "p2");
}
