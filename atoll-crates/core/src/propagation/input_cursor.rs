use super::CommittableInt;
use crate::basic_types::Timestamp;

/// The cursor behind [`Invariant::next_input`](super::Invariant::next_input).
///
/// During output-to-input exploration an invariant hands out its relevant inputs one at a time;
/// the cursor remembers how many inputs were handed out at the current timestamp. It restarts at
/// the first input whenever it is advanced at a new timestamp, so it never needs to be reset or
/// committed.
#[derive(Clone, Copy, Debug)]
pub struct InputCursor {
    position: CommittableInt,
}

impl Default for InputCursor {
    fn default() -> Self {
        InputCursor {
            position: CommittableInt::new(Timestamp::NULL, -1),
        }
    }
}

impl InputCursor {
    /// Moves to the next input and returns its position, starting from `0` at a new timestamp.
    pub fn advance(&mut self, timestamp: Timestamp) -> usize {
        self.position.inc_value(timestamp, 1) as usize
    }

    /// The position most recently returned by [`InputCursor::advance`] at `timestamp`.
    pub fn position(&self, timestamp: Timestamp) -> Option<usize> {
        usize::try_from(self.position.value(timestamp)).ok()
    }
}
