use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::cancel::{CancellationRegistry, Channel, TimerPurpose};
use super::event::{Activation, CaptureSignal, Event, RecognitionError, Ticket};
use super::executor::{Execution, IntentExecutor, Outcome, Request, Response};
use super::intent::{classify, Intent};
use super::scheduler::{DisplayUpdate, Prosody, Scheduler, SideEffect, Utterance};
use super::state::SessionState;
use super::telemetry::event::{InterruptionSource, RequestEventKind, RequestKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::turn::{TurnGraph, TurnPhase, TurnRequest};
use super::voice::{DowngradeCause, VoiceMode};
use crate::outputs::realizer::{acknowledgment, realize, Notice};

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// Wait before reopening the microphone after a no-speech error.
    pub retry_delay: Duration,
    /// Used in place of a speech completion when synthesis is unavailable.
    pub speech_stand_in_delay: Duration,
    /// Consecutive no-speech retries before voice is abandoned.
    pub max_no_speech_retries: u8,
    /// Say "Listening" before capture resumes.
    pub listening_cue: bool,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(1000),
            speech_stand_in_delay: Duration::from_millis(2000),
            max_no_speech_retries: 1,
            listening_cue: true,
        }
    }
}

/// Which speech capabilities exist in this runtime. Probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub capture: bool,
    pub synthesis: bool,
}

/// The turn-taking controller.
///
/// Consumes events, returns side effects for the driver. MUST NOT await I/O or timers.
pub struct Reactor {
    phase: TurnPhase,
    voice: VoiceMode,
    synthesis: bool,
    pub session: SessionState,
    pub telemetry: TelemetryRecorder,
    cancel_registry: CancellationRegistry,
    config: ReactorConfig,
    // Held while the acknowledgment plays.
    pending_intent: Option<Intent>,
    // Held while its round trip is in flight.
    pending_request: Option<Request>,
    // Remaining utterances of the current response.
    speech_plan: VecDeque<Utterance>,
    no_speech_streak: u8,
}

impl Reactor {
    pub fn new(config: ReactorConfig, capabilities: Capabilities) -> Self {
        Self {
            phase: TurnPhase::Idle,
            voice: VoiceMode::detect(capabilities.capture),
            synthesis: capabilities.synthesis,
            session: SessionState::new(),
            telemetry: TelemetryRecorder::new(),
            cancel_registry: CancellationRegistry::new(),
            config,
            pending_intent: None,
            pending_request: None,
            speech_plan: VecDeque::new(),
            no_speech_streak: 0,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn voice_mode(&self) -> VoiceMode {
        self.voice
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    /// Startup announcement, and the first capture when voice is available.
    pub fn boot(&mut self) -> Vec<SideEffect> {
        let mut effects = vec![SideEffect::Display(DisplayUpdate::VoiceMode(self.voice))];

        if self.voice.is_active() {
            info!("Voice input active. Opening microphone.");
            self.notify(&mut effects, Notice::ReadyToListen);
            self.start_capture(&mut effects);
        } else {
            info!("Voice input unsupported. Text input only.");
            self.notify(&mut effects, Notice::TextInterface);
        }

        effects
    }

    pub fn handle(&mut self, event: Event) -> Vec<SideEffect> {
        self.step(vec![event])
    }

    /// Applies a batch of events in arrival order.
    pub fn step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        for event in events {
            self.dispatch(event, &mut effects);
        }
        effects
    }

    fn dispatch(&mut self, event: Event, effects: &mut Vec<SideEffect>) {
        match event {
            Event::Capture { attempt, signal } => self.on_capture(attempt, signal, effects),
            Event::CaptureStartFailed { attempt, reason } => {
                if self.settle(Channel::Capture, attempt) {
                    warn!("Speech capture failed to start: {}", reason);
                    self.transition(TurnRequest::CaptureClosed);
                    self.downgrade(DowngradeCause::StartFailure, effects);
                }
            }
            Event::SpeechFinished(id) => {
                if self.settle(Channel::Speech, id) {
                    self.on_speech_done(effects);
                }
            }
            Event::TimerFired(id) => self.on_timer(id, effects),
            Event::SearchCompleted { ticket, outcome } => {
                self.on_response(ticket, Response::Search(outcome), effects)
            }
            Event::ContentLoaded { ticket, outcome } => {
                self.on_response(ticket, Response::Content(outcome), effects)
            }
            Event::Typed(text) => self.on_typed(&text, effects),
            Event::ResultActivated { index, action } => self.on_activation(index, action, effects),
            Event::ToggleCapture => self.on_toggle(effects),
            Event::Cancel => self.on_cancel(effects),
        }
    }

    // --- Capture ---

    fn on_capture(&mut self, attempt: Ticket, signal: CaptureSignal, effects: &mut Vec<SideEffect>) {
        if let CaptureSignal::Started = signal {
            if self.cancel_registry.is_live(Channel::Capture, attempt) {
                self.notify(effects, Notice::Listening);
            } else {
                self.record_stale(Channel::Capture, attempt);
            }
            return;
        }

        if !self.settle(Channel::Capture, attempt) {
            return;
        }

        match signal {
            CaptureSignal::Transcript(text) => {
                let text = text.trim();
                if text.is_empty() {
                    self.on_recognition_error(RecognitionError::NoSpeech, effects);
                } else {
                    self.no_speech_streak = 0;
                    self.begin_turn(text.to_string(), effects);
                }
            }
            CaptureSignal::Failed(error) => self.on_recognition_error(error, effects),
            CaptureSignal::Ended => {
                debug!("Capture ended without a transcript");
                self.transition(TurnRequest::CaptureClosed);
            }
            CaptureSignal::Started => {}
        }
    }

    fn on_recognition_error(&mut self, error: RecognitionError, effects: &mut Vec<SideEffect>) {
        self.transition(TurnRequest::CaptureClosed);

        match error {
            RecognitionError::NoSpeech if self.no_speech_streak < self.config.max_no_speech_retries => {
                self.no_speech_streak += 1;
                info!(
                    "No speech detected. Retrying capture in {:?} ({}/{})",
                    self.config.retry_delay, self.no_speech_streak, self.config.max_no_speech_retries
                );
                self.telemetry.record(TelemetryEvent::CaptureRetryScheduled {
                    attempt: self.no_speech_streak,
                });
                let id = self.cancel_registry.issue_timer(TimerPurpose::RetryCapture);
                effects.push(SideEffect::StartTimer { id, after: self.config.retry_delay });
            }
            RecognitionError::NoSpeech => self.downgrade(DowngradeCause::NoSpeech, effects),
            RecognitionError::PermissionDenied => {
                self.downgrade(DowngradeCause::PermissionDenied, effects)
            }
            RecognitionError::Other(reason) => {
                warn!("Speech recognition error: {}", reason);
                self.downgrade(DowngradeCause::RecognitionError, effects)
            }
        }
    }

    fn start_capture(&mut self, effects: &mut Vec<SideEffect>) {
        if !self.voice.is_active() {
            return;
        }
        if !self.transition(TurnRequest::BeginCapture) {
            return;
        }

        self.cancel_registry.revoke(Channel::Timer);
        let attempt = self.cancel_registry.issue(Channel::Capture);
        effects.push(SideEffect::StartCapture(attempt));
    }

    fn downgrade(&mut self, cause: DowngradeCause, effects: &mut Vec<SideEffect>) {
        let from = self.voice;
        self.voice = self.voice.downgrade();
        self.no_speech_streak = 0;
        self.cancel_registry.revoke(Channel::Timer);

        if from != self.voice {
            warn!("Voice mode {:?} -> {:?} ({:?})", from, self.voice, cause);
            self.telemetry.record(TelemetryEvent::VoiceDowngrade { from, to: self.voice, cause });
        }

        effects.push(SideEffect::Display(DisplayUpdate::VoiceMode(self.voice)));
        self.notify(effects, Notice::VoiceFallback(cause));
    }

    // --- Turn sequencing ---

    /// Idle or Capturing -> Announcing.
    fn begin_turn(&mut self, utterance: String, effects: &mut Vec<SideEffect>) {
        let intent = classify(&utterance);
        info!("Heard utterance, classified as {:?}", intent.kind());
        self.telemetry.record(TelemetryEvent::IntentClassified { kind: intent.kind() });

        if !self.transition(TurnRequest::Utterance) {
            return;
        }

        self.notify(effects, Notice::Heard(utterance.clone()));
        self.pending_intent = Some(intent);
        self.speak_or_stand_in(
            Utterance { text: acknowledgment(&utterance), prosody: Prosody::ACKNOWLEDGE },
            effects,
        );
    }

    fn on_speech_done(&mut self, effects: &mut Vec<SideEffect>) {
        match self.phase {
            TurnPhase::Announcing => {
                self.transition(TurnRequest::SpeechDone);
                match self.pending_intent.take() {
                    Some(intent) => self.run_intent(intent, effects),
                    None => {
                        warn!("Acknowledgment finished with no pending intent");
                        self.transition(TurnRequest::Interrupt);
                    }
                }
            }
            TurnPhase::Responding => self.advance_response(effects),
            other => debug!("Speech completion ignored in {:?}", other),
        }
    }

    /// Runs an intent from the Executing phase.
    fn run_intent(&mut self, intent: Intent, effects: &mut Vec<SideEffect>) {
        match IntentExecutor::execute(&mut self.session, intent) {
            Execution::Finished(outcome) => self.respond(outcome, effects),
            Execution::Awaiting { request, notice, display } => {
                self.notify(effects, notice);
                effects.extend(display.into_iter().map(SideEffect::Display));

                let ticket = self.cancel_registry.issue(Channel::Request);
                let (kind, effect) = match &request {
                    Request::Search { query } => (
                        RequestKind::Search,
                        SideEffect::Search { ticket, query: query.clone() },
                    ),
                    Request::Content { result_id, .. } => (
                        RequestKind::Content,
                        SideEffect::FetchContent { ticket, result_id: result_id.clone() },
                    ),
                };
                self.telemetry.record(TelemetryEvent::RequestLifecycle {
                    kind,
                    event: RequestEventKind::Issued,
                });
                effects.push(effect);
                self.pending_request = Some(request);
            }
        }
    }

    fn on_response(&mut self, ticket: Ticket, response: Response, effects: &mut Vec<SideEffect>) {
        if !self.settle(Channel::Request, ticket) {
            return;
        }
        let Some(request) = self.pending_request.take() else {
            warn!("Response {:?} arrived with no pending request", ticket);
            return;
        };

        let (kind, ok) = match &response {
            Response::Search(r) => (RequestKind::Search, r.is_ok()),
            Response::Content(r) => (RequestKind::Content, r.is_ok()),
        };
        self.telemetry.record(TelemetryEvent::RequestLifecycle {
            kind,
            event: if ok { RequestEventKind::Succeeded } else { RequestEventKind::Failed },
        });

        let outcome = IntentExecutor::complete(&mut self.session, request, response);
        self.respond(outcome, effects);
    }

    /// Executing -> Responding.
    fn respond(&mut self, outcome: Outcome, effects: &mut Vec<SideEffect>) {
        if !self.transition(TurnRequest::ResultReady) {
            return;
        }

        let feedback = realize(&outcome.notice);
        effects.push(SideEffect::Feedback(feedback.clone()));
        effects.extend(outcome.display.into_iter().map(SideEffect::Display));

        if self.synthesis {
            let cue = self.config.listening_cue && self.voice.is_active();
            self.speech_plan =
                Scheduler::plan_response(&feedback, outcome.read_aloud.as_deref(), cue);
            self.advance_response(effects);
        } else {
            self.speech_plan.clear();
            self.stand_in(effects);
        }
    }

    fn advance_response(&mut self, effects: &mut Vec<SideEffect>) {
        match self.speech_plan.pop_front() {
            Some(next) => self.speak(next, effects),
            None => self.finish_turn(effects),
        }
    }

    /// Responding -> Capturing (voice) or Idle (typed).
    fn finish_turn(&mut self, effects: &mut Vec<SideEffect>) {
        self.telemetry.record(TelemetryEvent::TurnCompleted);

        if self.voice.is_active() {
            self.start_capture(effects);
        } else {
            self.transition(TurnRequest::TurnComplete);
            self.notify(effects, Notice::ReadyForNext);
        }
    }

    fn speak_or_stand_in(&mut self, utterance: Utterance, effects: &mut Vec<SideEffect>) {
        if self.synthesis {
            self.speak(utterance, effects);
        } else {
            self.stand_in(effects);
        }
    }

    fn speak(&mut self, utterance: Utterance, effects: &mut Vec<SideEffect>) {
        let id = self.cancel_registry.issue(Channel::Speech);
        effects.push(SideEffect::Speak { id, text: utterance.text, prosody: utterance.prosody });
    }

    fn stand_in(&mut self, effects: &mut Vec<SideEffect>) {
        let id = self.cancel_registry.issue_timer(TimerPurpose::SpeechStandIn);
        effects.push(SideEffect::StartTimer { id, after: self.config.speech_stand_in_delay });
    }

    fn on_timer(&mut self, id: Ticket, effects: &mut Vec<SideEffect>) {
        match self.cancel_registry.settle_timer(id) {
            Some(TimerPurpose::RetryCapture) => {
                if self.phase == TurnPhase::Idle {
                    self.start_capture(effects);
                }
            }
            Some(TimerPurpose::SpeechStandIn) => self.on_speech_done(effects),
            None => self.record_stale(Channel::Timer, id),
        }
    }

    // --- User interjections ---

    fn on_typed(&mut self, text: &str, effects: &mut Vec<SideEffect>) {
        let text = text.trim();
        if text.is_empty() {
            self.notify(effects, Notice::EmptyQuery);
            return;
        }

        self.supersede(effects);
        self.begin_turn(text.to_string(), effects);
    }

    fn on_activation(&mut self, index: usize, action: Activation, effects: &mut Vec<SideEffect>) {
        let intent = match action {
            Activation::Open => Intent::SelectResult(index),
            Activation::Save => Intent::SaveResult(index),
        };
        info!("Result {} activated ({:?})", index, action);

        self.supersede(effects);
        if self.transition(TurnRequest::Activation) {
            self.run_intent(intent, effects);
        }
    }

    fn on_toggle(&mut self, effects: &mut Vec<SideEffect>) {
        match self.phase {
            TurnPhase::Capturing => {
                effects.push(SideEffect::StopCapture);
                self.cancel_registry.revoke(Channel::Capture);
                self.telemetry.record(TelemetryEvent::Interruption {
                    source: InterruptionSource::ManualToggle,
                    during: self.phase,
                });
                self.transition(TurnRequest::CaptureClosed);
            }
            TurnPhase::Idle if self.voice.is_active() => {
                self.no_speech_streak = 0;
                self.start_capture(effects);
            }
            // Mid-turn: silence output first, the microphone never opens over speech.
            TurnPhase::Announcing | TurnPhase::Executing | TurnPhase::Responding
                if self.voice.is_active() =>
            {
                effects.push(SideEffect::CancelSpeech);
                self.interrupt(InterruptionSource::ManualToggle);
                self.no_speech_streak = 0;
                self.start_capture(effects);
            }
            other => debug!("Capture toggle ignored in {:?} ({:?})", other, self.voice),
        }
    }

    fn on_cancel(&mut self, effects: &mut Vec<SideEffect>) {
        info!("Stop requested during {:?}", self.phase);
        effects.push(SideEffect::CancelSpeech);
        if self.phase == TurnPhase::Capturing {
            effects.push(SideEffect::StopCapture);
        }
        self.interrupt(InterruptionSource::ExplicitCancel);
        self.notify(effects, Notice::Stopped);
    }

    /// Clears whatever turn is in flight so a new input can start from Idle.
    fn supersede(&mut self, effects: &mut Vec<SideEffect>) {
        match self.phase {
            TurnPhase::Idle => {
                // A pending capture retry must not fire mid-turn.
                self.cancel_registry.revoke(Channel::Timer);
                return;
            }
            TurnPhase::Capturing => effects.push(SideEffect::StopCapture),
            TurnPhase::Announcing | TurnPhase::Responding => effects.push(SideEffect::CancelSpeech),
            TurnPhase::Executing => {}
        }
        self.interrupt(InterruptionSource::NewInput);
    }

    fn interrupt(&mut self, source: InterruptionSource) {
        self.telemetry.record(TelemetryEvent::Interruption { source, during: self.phase });

        let dropped = self.cancel_registry.cancel_all();
        if !dropped.is_empty() {
            debug!("Dropped in-flight work on {:?}", dropped);
        }
        self.pending_intent = None;
        self.pending_request = None;
        self.speech_plan.clear();
        self.transition(TurnRequest::Interrupt);
    }

    // --- Helpers ---

    fn transition(&mut self, request: TurnRequest) -> bool {
        match TurnGraph::transition(self.phase, request) {
            Some(next) => {
                if next != self.phase {
                    debug!("Turn {:?} -> {:?} ({:?})", self.phase, next, request);
                    self.telemetry.record(TelemetryEvent::PhaseTransition { from: self.phase, to: next });
                    self.phase = next;
                }
                true
            }
            None => {
                warn!("Rejected transition {:?} from {:?}", request, self.phase);
                false
            }
        }
    }

    fn settle(&mut self, channel: Channel, ticket: Ticket) -> bool {
        if self.cancel_registry.settle(channel, ticket) {
            true
        } else {
            self.record_stale(channel, ticket);
            false
        }
    }

    fn record_stale(&mut self, channel: Channel, ticket: Ticket) {
        debug!("Discarded stale {:?} signal {:?}", channel, ticket);
        self.telemetry.record(TelemetryEvent::StaleDiscarded { channel, ticket });
    }

    fn notify(&self, effects: &mut Vec<SideEffect>, notice: Notice) {
        effects.push(SideEffect::Feedback(realize(&notice)));
    }
}
