use crate::basic_types::Timestamp;

/// An integer with a committed value and at most one pending value.
///
/// The pending value is tagged with the timestamp at which it was written and is only visible
/// while that timestamp is queried. Invariants use this to keep auxiliary state (local copies of
/// input values, occurrence counts, cursors) that is discarded for free when a probe is abandoned
/// and promoted by [`CommittableInt::commit_if`] when a move is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommittableInt {
    committed: i64,
    pending: i64,
    timestamp: Timestamp,
}

impl CommittableInt {
    pub fn new(timestamp: Timestamp, value: i64) -> CommittableInt {
        CommittableInt {
            committed: value,
            pending: value,
            timestamp,
        }
    }

    /// The pending value if it was written at `timestamp`, and the committed value otherwise.
    pub fn value(&self, timestamp: Timestamp) -> i64 {
        if self.timestamp == timestamp {
            self.pending
        } else {
            self.committed
        }
    }

    pub fn committed_value(&self) -> i64 {
        self.committed
    }

    /// The timestamp of the last write.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Whether the value at `timestamp` differs from the committed value.
    pub fn has_changed(&self, timestamp: Timestamp) -> bool {
        self.timestamp == timestamp && self.pending != self.committed
    }

    pub fn set_value(&mut self, timestamp: Timestamp, value: i64) {
        self.timestamp = timestamp;
        self.pending = value;
    }

    /// Adds `delta` to the value at `timestamp` and returns the new value.
    pub fn inc_value(&mut self, timestamp: Timestamp, delta: i64) -> i64 {
        let value = self.value(timestamp) + delta;
        self.set_value(timestamp, value);
        value
    }

    /// Overwrites the committed value, discarding any pending value.
    pub fn commit_value(&mut self, value: i64) {
        self.committed = value;
        self.pending = value;
    }

    /// Promotes the pending value unconditionally.
    pub fn commit(&mut self) {
        self.committed = self.pending;
    }

    /// Promotes the pending value if it was written at `timestamp`.
    pub fn commit_if(&mut self, timestamp: Timestamp) {
        if self.timestamp == timestamp {
            self.committed = self.pending;
        }
    }
}
