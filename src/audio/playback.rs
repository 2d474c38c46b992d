use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::{split_command, AudioError, SpeechSynth};
use crate::kernel::event::{Event, Ticket};
use crate::kernel::scheduler::Prosody;

/// Speaks by spawning a TTS program per utterance (`say`, `espeak`, `espeak-ng`, ...).
/// The utterance text is always the last argument.
pub struct CommandSynth {
    program: String,
    args: Vec<String>,
    tx: mpsc::Sender<Event>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl CommandSynth {
    pub fn new(command_line: &str, tx: mpsc::Sender<Event>) -> Result<Self, AudioError> {
        let (program, args) = split_command(command_line)?;
        info!("Speech output via `{}`", program);
        Ok(Self { program, args, tx, stop_tx: None })
    }
}

fn program_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
}

/// Prosody flags for the TTS programs we know. Unknown programs get none.
pub fn prosody_args(program: &str, prosody: Prosody) -> Vec<String> {
    match program_name(program) {
        // `say` only exposes rate, in words per minute (default ~175).
        "say" => vec!["-r".to_string(), format!("{}", (175.0 * prosody.rate).round() as u32)],
        // espeak: speed wpm (default 175), pitch 0-99 (default 50), amplitude 0-200 (default 100).
        "espeak" | "espeak-ng" => vec![
            "-s".to_string(),
            format!("{}", (175.0 * prosody.rate).round() as u32),
            "-p".to_string(),
            format!("{}", (50.0 * prosody.pitch).clamp(0.0, 99.0).round() as u32),
            "-a".to_string(),
            format!("{}", (100.0 * prosody.volume).clamp(0.0, 200.0).round() as u32),
        ],
        _ => Vec::new(),
    }
}

/// Trailing arguments carrying the text. Known programs get `--` so text that
/// starts with `-` is never read as a flag.
pub fn text_args(program: &str, text: &str) -> Vec<String> {
    match program_name(program) {
        "say" | "espeak" | "espeak-ng" => vec!["--".to_string(), text.to_string()],
        _ => vec![text.to_string()],
    }
}

impl SpeechSynth for CommandSynth {
    fn speak(&mut self, id: Ticket, text: &str, prosody: Prosody) -> Result<(), AudioError> {
        // Speak-interrupt: never two utterances at once.
        self.cancel_all();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(prosody_args(&self.program, prosody))
            .args(text_args(&self.program, text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AudioError::Spawn { program: self.program.clone(), source })?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = child.wait() => {
                    let _ = tx.send(Event::SpeechFinished(id)).await;
                }
                _ = &mut stop_rx => {
                    let _ = child.kill().await;
                    debug!("Utterance {:?} interrupted", id);
                }
            }
        });

        Ok(())
    }

    fn cancel_all(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
