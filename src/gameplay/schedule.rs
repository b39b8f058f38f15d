//! Time-ordered list of deferred events keyed by absolute due time.

use serde::{Deserialize, Serialize};

/// One deferred entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduled<E> {
    pub due: f32,
    /// Insertion sequence; breaks ties between entries due at the same instant.
    pub seq: u64,
    pub event: E,
}

/// Deferred events drained by the orchestrator each tick.
///
/// Entries stay sorted by `(due, seq)`, so draining is a prefix split and events
/// scheduled for the same instant fire in the order they were scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSchedule<E> {
    entries: Vec<Scheduled<E>>,
    next_seq: u64,
}

impl<E> Default for EventSchedule<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<E> EventSchedule<E> {
    pub fn schedule(&mut self, due: f32, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        // Every existing entry has a lower seq, so it sorts first on equal `due`.
        let at = self.entries.partition_point(|e| e.due <= due);
        self.entries.insert(at, Scheduled { due, seq, event });
    }

    /// Remove and return every event with `due <= now`, earliest first.
    pub fn drain_due(&mut self, now: f32) -> Vec<E> {
        let split = self.entries.partition_point(|e| e.due <= now);
        self.entries.drain(..split).map(|e| e.event).collect()
    }

    /// Cancel everything at once.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scheduled<E>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn next_due(&self) -> Option<f32> {
        self.entries.first().map(|e| e.due)
    }
}
