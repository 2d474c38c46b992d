use std::collections::VecDeque;

use super::event::{RequestEventKind, TelemetryEvent};
use crate::kernel::turn::TurnPhase;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub turn_stats: TurnStats,
    pub interruption_count: u64,
    pub downgrade_count: u64,
    pub capture_retries: u64,
    pub stale_discards: u64,
    pub request_stats: RequestStats,
}

#[derive(Debug, Clone, Default)]
pub struct TurnStats {
    pub transitions: u64,
    pub captures_started: u64,
    pub utterances_announced: u64,
    /// Responding phases that ran to completion.
    pub responses_completed: u64,
    pub intents_classified: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RequestStats {
    pub issued: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub failure_ratio: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::PhaseTransition { from, to } => {
                snap.turn_stats.transitions += 1;
                match (from, to) {
                    (_, TurnPhase::Capturing) => snap.turn_stats.captures_started += 1,
                    (_, TurnPhase::Announcing) => snap.turn_stats.utterances_announced += 1,
                    _ => {}
                }
            }
            TelemetryEvent::IntentClassified { .. } => snap.turn_stats.intents_classified += 1,
            TelemetryEvent::TurnCompleted => snap.turn_stats.responses_completed += 1,
            TelemetryEvent::Interruption { .. } => snap.interruption_count += 1,
            TelemetryEvent::VoiceDowngrade { .. } => snap.downgrade_count += 1,
            TelemetryEvent::CaptureRetryScheduled { .. } => snap.capture_retries += 1,
            TelemetryEvent::StaleDiscarded { .. } => snap.stale_discards += 1,
            TelemetryEvent::RequestLifecycle { event, .. } => match event {
                RequestEventKind::Issued => snap.request_stats.issued += 1,
                RequestEventKind::Succeeded => snap.request_stats.succeeded += 1,
                RequestEventKind::Failed => snap.request_stats.failed += 1,
            },
        }
    }

    let settled = snap.request_stats.succeeded + snap.request_stats.failed;
    if settled > 0 {
        snap.request_stats.failure_ratio = snap.request_stats.failed as f64 / settled as f64;
    }

    snap
}
