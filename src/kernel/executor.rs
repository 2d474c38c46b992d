use tracing::{debug, info, warn};

use super::event::RequestFailure;
use super::intent::Intent;
use super::scheduler::DisplayUpdate;
use super::state::{Content, SearchPage, SessionDelta, SessionState};
use crate::outputs::realizer::Notice;

/// Final result of running an intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub notice: Notice,
    pub display: Vec<DisplayUpdate>,
    /// Body to read after the feedback (opened content).
    pub read_aloud: Option<String>,
}

impl Outcome {
    fn notice(notice: Notice) -> Self {
        Self { notice, display: Vec::new(), read_aloud: None }
    }
}

/// The single external round trip an intent may need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search { query: String },
    Content { result_id: String, title: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Finished(Outcome),
    /// Waiting on `request`. `notice` and `display` apply immediately.
    Awaiting {
        request: Request,
        notice: Notice,
        display: Vec<DisplayUpdate>,
    },
}

/// Response to a pending request, as delivered by the driver.
#[derive(Debug, Clone)]
pub enum Response {
    Search(Result<SearchPage, RequestFailure>),
    Content(Result<Content, RequestFailure>),
}

/// Runs intents against the session. Stateless; the session is passed in.
pub struct IntentExecutor;

impl IntentExecutor {
    pub fn execute(session: &mut SessionState, intent: Intent) -> Execution {
        debug!("Executing {:?}", intent.kind());

        match intent {
            Intent::Search(query) | Intent::SearchLiteral(query) => Self::search(query),
            Intent::SelectResult(index) => Self::select(session, index),
            Intent::SaveResult(index) => Execution::Finished(Self::save(session, index)),
            Intent::ClearResults => {
                session.reduce(SessionDelta::Cleared);
                Execution::Finished(Outcome {
                    notice: Notice::Cleared,
                    display: vec![DisplayUpdate::Cleared],
                    read_aloud: None,
                })
            }
        }
    }

    /// Applies a response to the request that produced it.
    /// A response of the wrong shape is reported as a transport failure.
    pub fn complete(session: &mut SessionState, request: Request, response: Response) -> Outcome {
        match (request, response) {
            (Request::Search { query }, Response::Search(outcome)) => match outcome {
                Ok(page) => {
                    let count = page.results.len();
                    info!("Search returned {} results", count);
                    if let Some(message) = &page.message {
                        debug!("Search service note: {}", message);
                    }
                    session.reduce(SessionDelta::ResultsReplaced { query, results: page.results });
                    Outcome {
                        notice: Notice::Found(count),
                        display: vec![DisplayUpdate::Results(session.results().to_vec())],
                        read_aloud: None,
                    }
                }
                Err(RequestFailure::Rejected(reason)) => {
                    warn!("Search rejected: {}", reason);
                    Outcome::notice(Notice::SearchFailed)
                }
                Err(RequestFailure::Network(reason)) => {
                    warn!("Search transport failure: {}", reason);
                    Outcome::notice(Notice::SearchNetworkError)
                }
            },
            (Request::Content { .. }, Response::Content(outcome)) => match outcome {
                Ok(content) => {
                    let body = content.content.clone();
                    Outcome {
                        notice: Notice::NowReading(content.title.clone()),
                        display: vec![DisplayUpdate::Content(content)],
                        read_aloud: Some(body),
                    }
                }
                Err(RequestFailure::Rejected(reason)) => {
                    warn!("Content rejected: {}", reason);
                    Outcome::notice(Notice::ContentFailed)
                }
                Err(RequestFailure::Network(reason)) => {
                    warn!("Content transport failure: {}", reason);
                    Outcome::notice(Notice::ContentError)
                }
            },
            (Request::Search { .. }, Response::Content(_)) => {
                warn!("Content response delivered to a search request");
                Outcome::notice(Notice::SearchNetworkError)
            }
            (Request::Content { .. }, Response::Search(_)) => {
                warn!("Search response delivered to a content request");
                Outcome::notice(Notice::ContentError)
            }
        }
    }

    fn search(query: String) -> Execution {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Execution::Finished(Outcome::notice(Notice::EmptyQuery));
        }

        Execution::Awaiting {
            notice: Notice::Searching(query.clone()),
            request: Request::Search { query },
            display: Vec::new(),
        }
    }

    fn select(session: &mut SessionState, index: usize) -> Execution {
        let Some(result) = session.result(index).cloned() else {
            info!("Selection {} outside 1..={}", index, session.results().len());
            return Execution::Finished(Outcome::notice(Notice::InvalidSelection {
                available: session.results().len(),
            }));
        };

        session.reduce(SessionDelta::Selected(index));

        Execution::Awaiting {
            notice: Notice::Opening(result.title.clone()),
            request: Request::Content { result_id: result.id, title: result.title },
            display: vec![DisplayUpdate::Selected(index)],
        }
    }

    fn save(session: &mut SessionState, index: usize) -> Outcome {
        let Some(result) = session.result(index).cloned() else {
            return Outcome::notice(Notice::InvalidSave);
        };

        if session.is_saved(&result.id) {
            return Outcome::notice(Notice::AlreadySaved(result.title));
        }

        let title = result.title.clone();
        session.reduce(SessionDelta::Saved(result));

        Outcome {
            notice: Notice::Saved(title),
            display: vec![DisplayUpdate::Saved(session.saved().to_vec())],
            read_aloud: None,
        }
    }
}
