use std::collections::VecDeque;
use std::time::Duration;

use super::event::Ticket;
use super::state::{Content, SearchResult};
use super::voice::VoiceMode;
use crate::outputs::realizer::LISTENING_CUE;

/// Speech synthesis parameters for one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Prosody {
    pub const ACKNOWLEDGE: Prosody = Prosody { rate: 1.0, pitch: 1.0, volume: 0.8 };
    pub const FEEDBACK: Prosody = Prosody { rate: 1.0, pitch: 1.0, volume: 0.8 };
    pub const READING: Prosody = Prosody { rate: 0.9, pitch: 1.0, volume: 0.8 };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub prosody: Prosody,
}

/// What the display sink should redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    Results(Vec<SearchResult>),
    Saved(Vec<SearchResult>),
    /// 1-based index of the highlighted result.
    Selected(usize),
    Content(Content),
    /// Results, selection and content panes reset.
    Cleared,
    VoiceMode(VoiceMode),
}

/// Work for the driver. The reactor never performs I/O itself.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Feedback(String),
    Display(DisplayUpdate),
    StartCapture(Ticket),
    StopCapture,
    /// Interrupts anything already playing.
    Speak {
        id: Ticket,
        text: String,
        prosody: Prosody,
    },
    CancelSpeech,
    StartTimer {
        id: Ticket,
        after: Duration,
    },
    Search {
        ticket: Ticket,
        query: String,
    },
    FetchContent {
        ticket: Ticket,
        result_id: String,
    },
}

pub struct Scheduler;

impl Scheduler {
    /// Pure Projection: feedback + optional body -> ordered speech plan.
    /// Feedback first, then the body at reading pace, then the listening cue.
    pub fn plan_response(feedback: &str, read_aloud: Option<&str>, cue: bool) -> VecDeque<Utterance> {
        let mut plan = VecDeque::new();
        plan.push_back(Utterance { text: feedback.to_string(), prosody: Prosody::FEEDBACK });

        if let Some(body) = read_aloud.filter(|b| !b.trim().is_empty()) {
            plan.push_back(Utterance { text: body.to_string(), prosody: Prosody::READING });
        }

        if cue {
            plan.push_back(Utterance { text: LISTENING_CUE.to_string(), prosody: Prosody::FEEDBACK });
        }

        plan
    }
}
