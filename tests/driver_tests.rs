use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use visifind::audio::{AudioError, SpeechSynth};
use visifind::driver::{Components, Driver, EVENT_CHANNEL_CAPACITY};
use visifind::kernel::event::{Event, Ticket};
use visifind::kernel::reactor::ReactorConfig;
use visifind::kernel::scheduler::{DisplayUpdate, Prosody};
use visifind::kernel::state::{Content, SearchPage, SearchResult};
use visifind::kernel::turn::TurnPhase;
use visifind::outputs::display::DisplaySink;
use visifind::services::search::{SearchBackend, ServiceError};

#[derive(Clone, Copy)]
enum Mode {
    Healthy,
    Rejecting,
    Hanging,
}

struct StubBackend {
    mode: Mode,
    searches: AtomicUsize,
    contents: AtomicUsize,
}

impl StubBackend {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self { mode, searches: AtomicUsize::new(0), contents: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, query: &str) -> Result<SearchPage, ServiceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::Healthy => Ok(SearchPage {
                results: vec![
                    SearchResult {
                        id: "p1".to_string(),
                        title: format!("Giant {}", query),
                        snippet: "Black and white".to_string(),
                        url: None,
                    },
                    SearchResult {
                        id: "p2".to_string(),
                        title: format!("Red {}", query),
                        snippet: "Smaller".to_string(),
                        url: None,
                    },
                ],
                message: None,
            }),
            Mode::Rejecting => Err(ServiceError::Rejected("Search service unavailable".to_string())),
            Mode::Hanging => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ServiceError::Decode("unreachable".to_string()))
            }
        }
    }

    async fn content(&self, result_id: &str) -> Result<Content, ServiceError> {
        self.contents.fetch_add(1, Ordering::SeqCst);
        Ok(Content {
            title: result_id.to_string(),
            content: format!("Body of {}", result_id),
            url: None,
        })
    }
}

/// Finishes every utterance the moment it starts.
struct InstantSynth {
    tx: mpsc::Sender<Event>,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl SpeechSynth for InstantSynth {
    fn speak(&mut self, id: Ticket, text: &str, _prosody: Prosody) -> Result<(), AudioError> {
        self.spoken.lock().unwrap().push(text.to_string());
        let _ = self.tx.try_send(Event::SpeechFinished(id));
        Ok(())
    }

    fn cancel_all(&mut self) {}
}

#[derive(Clone, Default)]
struct RecordingDisplay {
    feedback: Arc<Mutex<Vec<String>>>,
    renders: Arc<Mutex<Vec<DisplayUpdate>>>,
}

impl DisplaySink for RecordingDisplay {
    fn feedback(&mut self, message: &str) {
        self.feedback.lock().unwrap().push(message.to_string());
    }

    fn render(&mut self, update: &DisplayUpdate) {
        self.renders.lock().unwrap().push(update.clone());
    }
}

struct Harness {
    driver: Driver,
    backend: Arc<StubBackend>,
    display: RecordingDisplay,
    spoken: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(mode: Mode, request_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let backend = StubBackend::new(mode);
        let display = RecordingDisplay::default();
        let spoken = Arc::new(Mutex::new(Vec::new()));

        let components = Components {
            backend: backend.clone(),
            capture: None,
            synth: Some(Box::new(InstantSynth { tx: tx.clone(), spoken: spoken.clone() })),
            display: Box::new(display.clone()),
        };
        let mut driver = Driver::new(ReactorConfig::default(), tx, rx, components, request_timeout);
        driver.boot();

        Self { driver, backend, display, spoken }
    }

    /// Types a line and steps until the turn is back at rest.
    async fn say(&mut self, line: &str) {
        self.driver
            .sender()
            .send(Event::Typed(line.to_string()))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                assert!(self.driver.turn().await, "event channel closed");
                if self.driver.reactor().phase() == TurnPhase::Idle {
                    break;
                }
            }
        })
        .await
        .expect("turn should settle");
    }

    fn last_feedback(&self) -> Vec<String> {
        let all = self.display.feedback.lock().unwrap();
        let start = all.len().saturating_sub(2);
        all[start..].to_vec()
    }
}

#[tokio::test]
async fn test_typed_session_end_to_end() {
    let mut h = Harness::new(Mode::Healthy, Duration::from_secs(5));
    assert_eq!(
        h.display.feedback.lock().unwrap().first().map(String::as_str),
        Some("Using text-based search interface.")
    );

    h.say("search for pandas").await;
    let session = &h.driver.reactor().session;
    assert_eq!(session.results().len(), 2);
    assert_eq!(session.current_query(), "pandas");
    assert_eq!(h.backend.searches.load(Ordering::SeqCst), 1);
    assert!(h.last_feedback()[0].starts_with("Found 2 results"));
    assert_eq!(h.last_feedback()[1], "Ready for your next command");

    h.say("save result 2").await;
    let session = &h.driver.reactor().session;
    assert_eq!(session.saved().len(), 1);
    assert_eq!(session.saved()[0].id, "p2");

    h.say("clear results").await;
    let session = &h.driver.reactor().session;
    assert!(session.results().is_empty());
    assert_eq!(session.saved().len(), 1);
    assert!(h.display.renders.lock().unwrap().contains(&DisplayUpdate::Cleared));

    h.say("select result 1").await;
    assert!(h.last_feedback()[0].starts_with("Invalid result number"));
    assert_eq!(h.backend.contents.load(Ordering::SeqCst), 0);

    // Speech never plays the raw quote-wrapped feedback for the acknowledgment.
    let spoken = h.spoken.lock().unwrap();
    assert_eq!(spoken[0], "You said: search for pandas");
}

#[tokio::test]
async fn test_opening_a_result_reads_its_body() {
    let mut h = Harness::new(Mode::Healthy, Duration::from_secs(5));
    h.say("find pandas").await;
    h.say("open result 1").await;

    assert_eq!(h.backend.contents.load(Ordering::SeqCst), 1);
    assert_eq!(h.driver.reactor().session.selected_index(), Some(1));

    let spoken = h.spoken.lock().unwrap();
    let reading = spoken.iter().position(|s| s == "Now reading \"p1\"").expect("feedback spoken");
    assert_eq!(spoken[reading + 1], "Body of p1");
}

#[tokio::test]
async fn test_rejected_search_reports_failure() {
    let mut h = Harness::new(Mode::Rejecting, Duration::from_secs(5));
    h.say("search for pandas").await;

    assert_eq!(h.last_feedback()[0], "Search failed. Please try again.");
    assert!(h.driver.reactor().session.results().is_empty());
    assert_eq!(h.driver.reactor().telemetry.snapshot().request_stats.failed, 1);
}

#[tokio::test]
async fn test_hung_search_times_out_as_network_error() {
    let mut h = Harness::new(Mode::Hanging, Duration::from_millis(50));
    h.say("search for pandas").await;

    assert_eq!(h.last_feedback()[0], "Network error. Please check your connection.");
    assert_eq!(h.backend.searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_returns_reactor_on_shutdown() {
    let h = Harness::new(Mode::Healthy, Duration::from_secs(5));
    let sender = h.driver.sender();
    let shutdown = CancellationToken::new();

    let handle = tokio::spawn(h.driver.run(shutdown.clone()));
    sender.send(Event::Typed("reset".to_string())).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();
    let reactor = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("driver stops")
        .unwrap();

    assert_eq!(reactor.phase(), TurnPhase::Idle);
    assert_eq!(reactor.telemetry.snapshot().turn_stats.responses_completed, 1);
}

#[tokio::test]
async fn test_startup_is_announced_once_when_booted_before_run() {
    let h = Harness::new(Mode::Healthy, Duration::from_secs(5));
    let feedback = h.display.feedback.clone();
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let reactor = h.driver.run(shutdown).await;

    let announcements = feedback
        .lock()
        .unwrap()
        .iter()
        .filter(|f| f.as_str() == "Using text-based search interface.")
        .count();
    assert_eq!(announcements, 1);
    assert_eq!(reactor.phase(), TurnPhase::Idle);
}
