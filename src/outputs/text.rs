use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::audio::{AudioError, SpeechSynth};
use crate::kernel::event::{Event, Ticket};
use crate::kernel::scheduler::Prosody;

/// Speech output for terminals without a TTS engine: prints the utterance and
/// reports completion after a reading-time estimate.
pub struct TextSynth {
    tx: mpsc::Sender<Event>,
    per_word: Duration,
    current: Option<JoinHandle<()>>,
}

impl TextSynth {
    pub fn new(tx: mpsc::Sender<Event>, per_word: Duration) -> Self {
        Self { tx, per_word, current: None }
    }

    /// Estimated playback time, stretched for slower speech rates.
    pub fn duration_for(&self, text: &str, prosody: Prosody) -> Duration {
        let words = text.split_whitespace().count() as u32;
        let rate = if prosody.rate > 0.0 { prosody.rate } else { 1.0 };
        // Saturates rather than panicking on absurd pacing settings.
        let base = self.per_word.checked_mul(words).unwrap_or(Duration::MAX);
        Duration::try_from_secs_f64(base.as_secs_f64() / f64::from(rate)).unwrap_or(Duration::MAX)
    }
}

impl SpeechSynth for TextSynth {
    fn speak(&mut self, id: Ticket, text: &str, prosody: Prosody) -> Result<(), AudioError> {
        self.cancel_all();

        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "  \u{1f50a} {}", text);
        drop(stdout);

        let delay = self.duration_for(text, prosody);
        let tx = self.tx.clone();
        self.current = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::SpeechFinished(id)).await;
        }));

        Ok(())
    }

    fn cancel_all(&mut self) {
        if let Some(task) = self.current.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pacing_scales_with_words_and_rate() {
        let (tx, _rx) = mpsc::channel(1);
        let synth = TextSynth::new(tx, Duration::from_millis(100));
        let normal = synth.duration_for("one two three", Prosody::FEEDBACK).as_millis();
        assert!((299..=300).contains(&normal), "got {}ms", normal);
        assert!(synth.duration_for("one two three", Prosody::READING) > Duration::from_millis(300));
    }

    #[tokio::test]
    async fn huge_pacing_saturates() {
        let (tx, _rx) = mpsc::channel(1);
        let synth = TextSynth::new(tx, Duration::from_millis(u64::MAX));
        assert_eq!(
            synth.duration_for("a very long sentence indeed", Prosody::READING),
            Duration::MAX
        );
    }
}
