use serde::{Deserialize, Serialize};

/// Process-wide voice capability. Resolved once at startup, only ever downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceMode {
    /// No capture capability in this runtime.
    Unsupported,
    /// Capture existed but failed unrecoverably; typed input only.
    FallbackManual,
    Active,
}

impl VoiceMode {
    /// Startup probe result. Never re-probed.
    pub fn detect(capture_available: bool) -> Self {
        if capture_available {
            VoiceMode::Active
        } else {
            VoiceMode::Unsupported
        }
    }

    /// Active -> FallbackManual. Every other mode stays where it is.
    pub fn downgrade(self) -> Self {
        match self {
            VoiceMode::Active => VoiceMode::FallbackManual,
            other => other,
        }
    }

    pub fn is_active(self) -> bool {
        self == VoiceMode::Active
    }
}

/// Why voice was abandoned for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DowngradeCause {
    PermissionDenied,
    StartFailure,
    /// No-speech retry budget exhausted.
    NoSpeech,
    RecognitionError,
}
