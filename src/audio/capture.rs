use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{split_command, AudioError, SpeechCapture};
use crate::kernel::event::{CaptureSignal, Event, RecognitionError, Ticket};

/// sysexits EX_NOPERM: the recognizer could not open the microphone.
pub const EXIT_PERMISSION_DENIED: i32 = 77;

/// Runs an external one-shot recognizer per attempt.
///
/// Protocol: the command records one utterance and prints the transcript on stdout.
/// Empty stdout means no speech; exit code 77 means microphone permission was denied;
/// any other failure is a generic recognition error.
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
    tx: mpsc::Sender<Event>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl CommandCapture {
    pub fn new(command_line: &str, tx: mpsc::Sender<Event>) -> Result<Self, AudioError> {
        let (program, args) = split_command(command_line)?;
        info!("Speech capture via `{}`", program);
        Ok(Self { program, args, tx, stop_tx: None })
    }
}

impl SpeechCapture for CommandCapture {
    fn start(&mut self, attempt: Ticket) -> Result<(), AudioError> {
        self.stop();

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AudioError::Spawn { program: self.program.clone(), source })?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let _ = tx.send(Event::Capture { attempt, signal: CaptureSignal::Started }).await;

            // Dropping the wait future drops the child, which kills it.
            let signal = tokio::select! {
                output = child.wait_with_output() => interpret_output(output),
                _ = &mut stop_rx => {
                    debug!("Capture {:?} stopped", attempt);
                    return;
                }
            };

            let _ = tx.send(Event::Capture { attempt, signal }).await;
            let _ = tx.send(Event::Capture { attempt, signal: CaptureSignal::Ended }).await;
        });

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

/// Maps the recognizer's exit into a capture signal.
pub fn interpret_output(output: std::io::Result<Output>) -> CaptureSignal {
    let output = match output {
        Ok(output) => output,
        Err(e) => return CaptureSignal::Failed(RecognitionError::Other(e.to_string())),
    };

    if output.status.success() {
        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        return if transcript.is_empty() {
            CaptureSignal::Failed(RecognitionError::NoSpeech)
        } else {
            CaptureSignal::Transcript(transcript)
        };
    }

    match output.status.code() {
        Some(EXIT_PERMISSION_DENIED) => CaptureSignal::Failed(RecognitionError::PermissionDenied),
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Recognizer exited with {:?}: {}", code, stderr);
            CaptureSignal::Failed(RecognitionError::Other(if stderr.is_empty() {
                format!("exit status {:?}", code)
            } else {
                stderr
            }))
        }
    }
}
