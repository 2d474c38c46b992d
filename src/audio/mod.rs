//! Speech capture and synthesis capabilities.
//!
//! The reactor never talks to these directly; the driver calls them for
//! `StartCapture` / `Speak` effects and they report back over the event channel.

pub mod capture;
pub mod playback;

use thiserror::Error;

use crate::kernel::event::Ticket;
use crate::kernel::scheduler::Prosody;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("empty command line")]
    EmptyCommand,
}

/// Microphone-to-text. Emits `Event::Capture` signals tagged with `attempt`.
pub trait SpeechCapture: Send {
    fn start(&mut self, attempt: Ticket) -> Result<(), AudioError>;
    /// Stops the current attempt. It reports nothing further.
    fn stop(&mut self);
}

/// Text-to-audio. Emits `Event::SpeechFinished(id)` when an utterance plays out.
/// A new `speak` interrupts the one in flight; interrupted utterances never report.
pub trait SpeechSynth: Send {
    fn speak(&mut self, id: Ticket, text: &str, prosody: Prosody) -> Result<(), AudioError>;
    fn cancel_all(&mut self);
}

/// Splits a configured command line into program and arguments.
pub fn split_command(line: &str) -> Result<(String, Vec<String>), AudioError> {
    let mut parts = line.split_whitespace().map(str::to_string);
    let program = parts.next().ok_or(AudioError::EmptyCommand)?;
    Ok((program, parts.collect()))
}
