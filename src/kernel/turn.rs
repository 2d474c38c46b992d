use serde::{Deserialize, Serialize};

/// Phases of one voice turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Nothing in flight. Waiting for typed input, a toggle, or a retry timer.
    Idle,
    /// Microphone open. Never overlaps with speech output.
    Capturing,
    /// Speaking back what was heard.
    Announcing,
    /// Intent running, possibly awaiting one network round trip.
    Executing,
    /// Speaking feedback and any opened content.
    Responding,
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Requests for a phase transition.
/// These are REQUESTS, not forces. The graph validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRequest {
    BeginCapture,
    /// Capture ended without a transcript (error, stop, silence).
    CaptureClosed,
    Utterance,
    /// Direct result activation skips the acknowledgment.
    Activation,
    SpeechDone,
    ResultReady,
    TurnComplete,
    /// Explicit stop or a new input superseding the turn.
    Interrupt,
}

pub struct TurnGraph;

impl TurnGraph {
    /// Pure function: (Current Phase, Request) -> New Phase
    /// Returns None if the transition is invalid/ignored.
    pub fn transition(current: TurnPhase, request: TurnRequest) -> Option<TurnPhase> {
        use TurnPhase::*;
        use TurnRequest::*;

        match (current, request) {
            // Capture is only entered from rest or from the end of a response.
            (Idle, BeginCapture) => Some(Capturing),
            (Responding, BeginCapture) => Some(Capturing),

            (Capturing, CaptureClosed) => Some(Idle),
            (Capturing, Utterance) => Some(Announcing),
            (Idle, Utterance) => Some(Announcing),
            (Idle, Activation) => Some(Executing),

            (Announcing, SpeechDone) => Some(Executing),
            (Executing, ResultReady) => Some(Responding),
            (Responding, TurnComplete) => Some(Idle),

            (_, Interrupt) => Some(Idle),

            _ => None,
        }
    }
}
