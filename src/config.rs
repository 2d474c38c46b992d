use clap::Parser;
use std::time::Duration;

use crate::kernel::reactor::ReactorConfig;

/// Voice-driven search and read-aloud client.
#[derive(Debug, Clone, Parser)]
#[command(name = "visifind", version, about)]
pub struct AppConfig {
    /// Base URL of the search/content service.
    #[arg(long, env = "VISIFIND_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// One-shot speech recognizer command. Prints the transcript on stdout.
    /// Voice input is unsupported when unset.
    #[arg(long, env = "VISIFIND_RECOGNIZER")]
    pub recognizer: Option<String>,

    /// Text-to-speech command (e.g. `say`, `espeak-ng`). The text is appended as the last argument.
    #[arg(long, env = "VISIFIND_TTS")]
    pub tts: Option<String>,

    /// Print speech to the terminal when no TTS command is configured.
    #[arg(long, env = "VISIFIND_PRINT_SPEECH")]
    pub print_speech: bool,

    /// Pacing for printed speech, per word.
    #[arg(long, env = "VISIFIND_PRINT_SPEECH_MS_PER_WORD", default_value_t = 250)]
    pub print_speech_ms_per_word: u64,

    /// Deadline for each search/content request.
    #[arg(long, env = "VISIFIND_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Delay before reopening the microphone after hearing nothing.
    #[arg(long, env = "VISIFIND_RETRY_DELAY_MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Pause standing in for speech when no speech output exists.
    #[arg(long, env = "VISIFIND_SPEECH_STAND_IN_MS", default_value_t = 2000)]
    pub speech_stand_in_ms: u64,

    /// Consecutive no-speech retries before falling back to typed input.
    #[arg(long, env = "VISIFIND_NO_SPEECH_RETRIES", default_value_t = 1)]
    pub no_speech_retries: u8,

    /// Do not say "Listening" before reopening the microphone.
    #[arg(long, env = "VISIFIND_NO_LISTENING_CUE")]
    pub no_listening_cue: bool,
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reactor_config(&self) -> ReactorConfig {
        ReactorConfig {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            speech_stand_in_delay: Duration::from_millis(self.speech_stand_in_ms),
            max_no_speech_retries: self.no_speech_retries,
            listening_cue: !self.no_listening_cue,
        }
    }
}
