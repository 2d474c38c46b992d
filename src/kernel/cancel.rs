use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::event::Ticket;

/// Independent kinds of in-flight work. At most one live ticket per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Capture,
    Speech,
    Timer,
    Request,
}

/// What a timer stands for when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Restart capture after a no-speech error.
    RetryCapture,
    /// Substitute for a speech completion when synthesis is unavailable.
    SpeechStandIn,
}

/// Tracks which tickets are still live. Completions for anything else are stale.
/// Actual tokio handles live in the driver, not here.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    next: u64,
    live: HashMap<Channel, Ticket>,
    timer_purpose: Option<TimerPurpose>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh ticket on a channel, superseding whatever was live there.
    pub fn issue(&mut self, channel: Channel) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.live.insert(channel, ticket);
        if channel == Channel::Timer {
            self.timer_purpose = None;
        }
        ticket
    }

    pub fn issue_timer(&mut self, purpose: TimerPurpose) -> Ticket {
        let ticket = self.issue(Channel::Timer);
        self.timer_purpose = Some(purpose);
        ticket
    }

    pub fn is_live(&self, channel: Channel, ticket: Ticket) -> bool {
        self.live.get(&channel) == Some(&ticket)
    }

    pub fn has_live(&self, channel: Channel) -> bool {
        self.live.contains_key(&channel)
    }

    /// Consumes a completion. Returns false (and changes nothing) for stale tickets.
    pub fn settle(&mut self, channel: Channel, ticket: Ticket) -> bool {
        if !self.is_live(channel, ticket) {
            return false;
        }
        self.live.remove(&channel);
        true
    }

    /// Settles a timer, handing back what it was for.
    pub fn settle_timer(&mut self, ticket: Ticket) -> Option<TimerPurpose> {
        if self.settle(Channel::Timer, ticket) {
            self.timer_purpose.take()
        } else {
            None
        }
    }

    pub fn revoke(&mut self, channel: Channel) -> Option<Ticket> {
        if channel == Channel::Timer {
            self.timer_purpose = None;
        }
        self.live.remove(&channel)
    }

    /// Drops every live ticket. Returns the channels that had one.
    pub fn cancel_all(&mut self) -> Vec<Channel> {
        self.timer_purpose = None;
        let mut channels: Vec<Channel> = self.live.drain().map(|(c, _)| c).collect();
        channels.sort_by_key(|c| *c as u8);
        channels
    }
}
