use serde::{Deserialize, Serialize};

use super::state::{Content, SearchPage};

/// Stamp carried by every capture attempt, utterance, timer and request.
/// Completions are only honoured while their ticket is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone)]
pub enum Event {
    /// Signals from the speech capture capability, tagged with the attempt that produced them.
    Capture { attempt: Ticket, signal: CaptureSignal },
    /// The capture capability refused to start.
    CaptureStartFailed { attempt: Ticket, reason: String },
    /// An utterance finished playing (cancelled utterances never report).
    SpeechFinished(Ticket),
    TimerFired(Ticket),
    SearchCompleted {
        ticket: Ticket,
        outcome: Result<SearchPage, RequestFailure>,
    },
    ContentLoaded {
        ticket: Ticket,
        outcome: Result<Content, RequestFailure>,
    },
    /// Raw text from the typed-input path.
    Typed(String),
    /// Direct interaction with a rendered result (click / keyboard).
    ResultActivated { index: usize, action: Activation },
    ToggleCapture,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSignal {
    Started,
    Transcript(String),
    Ended,
    Failed(RecognitionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    PermissionDenied,
    NoSpeech,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Open,
    Save,
}

/// Cloneable projection of a backend failure, as seen by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The service answered but reported `success: false`.
    Rejected(String),
    /// Transport, timeout or undecodable response.
    Network(String),
}
