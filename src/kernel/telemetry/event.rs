use serde::{Deserialize, Serialize};

use crate::kernel::cancel::Channel;
use crate::kernel::event::Ticket;
use crate::kernel::intent::IntentKind;
use crate::kernel::turn::TurnPhase;
use crate::kernel::voice::{DowngradeCause, VoiceMode};

// Allowed: Tickets, Phases, Kinds, Counts
// Forbidden: Utterances, Queries, Titles, Content

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PhaseTransition {
        from: TurnPhase,
        to: TurnPhase,
    },

    IntentClassified {
        kind: IntentKind,
    },

    /// Response speech finished and the turn handed off normally.
    TurnCompleted,

    Interruption {
        source: InterruptionSource,
        during: TurnPhase,
    },

    VoiceDowngrade {
        from: VoiceMode,
        to: VoiceMode,
        cause: DowngradeCause,
    },

    CaptureRetryScheduled {
        attempt: u8,
    },

    StaleDiscarded {
        channel: Channel,
        ticket: Ticket,
    },

    RequestLifecycle {
        kind: RequestKind,
        event: RequestEventKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionSource {
    ExplicitCancel,
    ManualToggle,
    /// Typed input or a result activation superseding the turn.
    NewInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Search,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestEventKind {
    Issued,
    Succeeded,
    Failed,
}
