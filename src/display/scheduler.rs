use crate::core::message::MessageId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_RECLASSIFY_DELAY: Duration = Duration::from_millis(100);
/// Streaming output arrives in bursts; wait a little longer for it to settle.
pub const STREAMING_RECLASSIFY_DELAY: Duration = Duration::from_millis(150);

pub fn reclassify_delay(streaming: bool) -> Duration {
    if streaming {
        STREAMING_RECLASSIFY_DELAY
    } else {
        DEFAULT_RECLASSIFY_DELAY
    }
}

/// Per-message debounce timers for height reclassification.
///
/// At most one deadline exists per message. Scheduling again replaces the
/// deadline, so a burst of mutations collapses into one classification that
/// runs `delay` after the last of them.
#[derive(Debug, Default)]
pub struct DebounceScheduler {
    pending: HashMap<MessageId, Instant>,
}

impl DebounceScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an earlier deadline was replaced.
    pub fn schedule(&mut self, id: MessageId, delay: Duration, now: Instant) -> bool {
        self.pending.insert(id, now + delay).is_some()
    }

    pub fn cancel(&mut self, id: MessageId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every message whose deadline has passed, earliest
    /// deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<MessageId> {
        let mut due: Vec<(Instant, MessageId)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
