use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::audio::{SpeechCapture, SpeechSynth};
use crate::kernel::event::{Event, RequestFailure};
use crate::kernel::reactor::{Capabilities, Reactor, ReactorConfig};
use crate::kernel::scheduler::SideEffect;
use crate::outputs::display::DisplaySink;
use crate::services::search::{SearchBackend, ServiceError};

pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// External collaborators wired into a driver.
pub struct Components {
    pub backend: Arc<dyn SearchBackend>,
    pub capture: Option<Box<dyn SpeechCapture>>,
    pub synth: Option<Box<dyn SpeechSynth>>,
    pub display: Box<dyn DisplaySink>,
}

/// Async shell around the reactor: drains events, steps the kernel, performs effects.
/// Every completion comes back through the same channel.
pub struct Driver {
    reactor: Reactor,
    receiver: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    backend: Arc<dyn SearchBackend>,
    capture: Option<Box<dyn SpeechCapture>>,
    synth: Option<Box<dyn SpeechSynth>>,
    display: Box<dyn DisplaySink>,
    request_timeout: Duration,
    booted: bool,
}

impl Driver {
    /// Capabilities are probed here, once: whatever is absent stays absent.
    pub fn new(
        config: ReactorConfig,
        tx: mpsc::Sender<Event>,
        receiver: mpsc::Receiver<Event>,
        components: Components,
        request_timeout: Duration,
    ) -> Self {
        let capabilities = Capabilities {
            capture: components.capture.is_some(),
            synthesis: components.synth.is_some(),
        };
        info!("Capabilities: {:?}", capabilities);

        Self {
            reactor: Reactor::new(config, capabilities),
            receiver,
            tx,
            backend: components.backend,
            capture: components.capture,
            synth: components.synth,
            display: components.display,
            request_timeout,
            booted: false,
        }
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Startup announcement and first capture. Only the first call does anything.
    pub fn boot(&mut self) {
        if self.booted {
            return;
        }
        self.booted = true;
        let effects = self.reactor.boot();
        self.apply(effects);
    }

    /// Waits for at least one event, drains whatever else is queued, and steps once.
    /// Returns false when the channel is closed.
    pub async fn turn(&mut self) -> bool {
        let Some(first) = self.receiver.recv().await else {
            return false;
        };

        let mut events = vec![first];
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }

        let effects = self.reactor.step(events);
        self.apply(effects);
        true
    }

    /// Runs until `shutdown` fires, booting first if nobody has. Hands back the reactor.
    pub async fn run(mut self, shutdown: CancellationToken) -> Reactor {
        self.boot();
        info!("Driver loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                alive = self.turn() => {
                    if !alive {
                        break;
                    }
                }
            }
        }

        if let Some(capture) = self.capture.as_mut() {
            capture.stop();
        }
        if let Some(synth) = self.synth.as_mut() {
            synth.cancel_all();
        }

        let snapshot = self.reactor.telemetry.snapshot();
        info!(
            "Session ended: {} turns, {} interruptions, {} requests ({} failed)",
            snapshot.turn_stats.responses_completed,
            snapshot.interruption_count,
            snapshot.request_stats.issued,
            snapshot.request_stats.failed
        );

        self.reactor
    }

    fn apply(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            debug!("Effect: {:?}", effect);
            match effect {
                SideEffect::Feedback(message) => self.display.feedback(&message),
                SideEffect::Display(update) => self.display.render(&update),

                SideEffect::StartCapture(attempt) => {
                    let started = match self.capture.as_mut() {
                        Some(capture) => capture.start(attempt).map_err(|e| e.to_string()),
                        None => Err("no speech capture available".to_string()),
                    };
                    if let Err(reason) = started {
                        warn!("Capture start failed: {}", reason);
                        self.post(Event::CaptureStartFailed { attempt, reason });
                    }
                }
                SideEffect::StopCapture => {
                    if let Some(capture) = self.capture.as_mut() {
                        capture.stop();
                    }
                }

                SideEffect::Speak { id, text, prosody } => {
                    let spoken = match self.synth.as_mut() {
                        Some(synth) => synth.speak(id, &text, prosody).map_err(|e| e.to_string()),
                        None => Err("no speech output available".to_string()),
                    };
                    // A turn must never stall on a silent failure.
                    if let Err(reason) = spoken {
                        warn!("Speech failed: {}", reason);
                        self.post(Event::SpeechFinished(id));
                    }
                }
                SideEffect::CancelSpeech => {
                    if let Some(synth) = self.synth.as_mut() {
                        synth.cancel_all();
                    }
                }

                SideEffect::StartTimer { id, after } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::TimerFired(id)).await;
                    });
                }

                SideEffect::Search { ticket, query } => {
                    let backend = self.backend.clone();
                    let tx = self.tx.clone();
                    let deadline = self.request_timeout;
                    tokio::spawn(async move {
                        let outcome = settle(deadline, backend.search(&query)).await;
                        let _ = tx.send(Event::SearchCompleted { ticket, outcome }).await;
                    });
                }
                SideEffect::FetchContent { ticket, result_id } => {
                    let backend = self.backend.clone();
                    let tx = self.tx.clone();
                    let deadline = self.request_timeout;
                    tokio::spawn(async move {
                        let outcome = settle(deadline, backend.content(&result_id)).await;
                        let _ = tx.send(Event::ContentLoaded { ticket, outcome }).await;
                    });
                }
            }
        }
    }

    /// Queues an event from synchronous code without blocking the loop.
    fn post(&self, event: Event) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(event).await;
        });
    }
}

/// Hard deadline on top of the client's own timeout.
async fn settle<T, F>(deadline: Duration, request: F) -> Result<T, RequestFailure>
where
    F: std::future::Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(deadline, request).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("Request failed: {}", e);
            Err(e.into())
        }
        Err(_) => {
            warn!("Request timed out after {:?}", deadline);
            Err(ServiceError::Timeout(deadline).into())
        }
    }
}
