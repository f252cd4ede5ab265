use crate::basic_types::Timestamp;
use crate::propagation::CommittableInt;
use crate::propagation::InvariantId;
use crate::propagation::LocalId;
use crate::propagation::VarId;
use crate::propagation::VarViewId;

/// An arc from a variable to an invariant which reads it as the input with `local_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct OutgoingArc {
    pub(crate) invariant_id: InvariantId,
    pub(crate) local_id: LocalId,
}

/// A registered input of an invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IncomingArc {
    /// The id as registered, which may be a view.
    pub(crate) id: VarViewId,
    /// The variable the arc starts at.
    pub(crate) source: VarId,
    /// For a dynamic input, the index of the arc among the dynamic arcs of `source`.
    pub(crate) dynamic_index: Option<usize>,
}

/// The dynamic outgoing arcs of a variable.
///
/// The arcs are kept in a sparse set whose positions are [`CommittableInt`]s: the arcs at
/// positions `0..num_active` are active. Activating or deactivating an arc swaps two positions,
/// so changes made at a timestamp are dropped or promoted together with every other pending
/// value.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutgoingDynamicArcs {
    arcs: Vec<OutgoingArc>,
    /// The position of every arc.
    positions: Vec<CommittableInt>,
    /// The arc at every position.
    arc_at: Vec<CommittableInt>,
    num_active: CommittableInt,
}

impl OutgoingDynamicArcs {
    pub(crate) fn push(&mut self, arc: OutgoingArc) -> usize {
        let index = self.arcs.len();
        self.arcs.push(arc);
        self.positions
            .push(CommittableInt::new(Timestamp::NULL, index as i64));
        self.arc_at
            .push(CommittableInt::new(Timestamp::NULL, index as i64));
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.arcs.len()
    }

    pub(crate) fn is_active(&self, timestamp: Timestamp, index: usize) -> bool {
        self.positions[index].value(timestamp) < self.num_active.value(timestamp)
    }

    pub(crate) fn make_active(&mut self, timestamp: Timestamp, index: usize) {
        if self.is_active(timestamp, index) {
            return;
        }
        let boundary = self.num_active.value(timestamp) as usize;
        self.swap_positions(timestamp, index, boundary);
        let _ = self.num_active.inc_value(timestamp, 1);
    }

    pub(crate) fn make_inactive(&mut self, timestamp: Timestamp, index: usize) {
        if !self.is_active(timestamp, index) {
            return;
        }
        let last_active = self.num_active.value(timestamp) as usize - 1;
        self.swap_positions(timestamp, index, last_active);
        let _ = self.num_active.inc_value(timestamp, -1);
    }

    /// The arcs which are active at `timestamp`.
    pub(crate) fn active_arcs(&self, timestamp: Timestamp) -> impl Iterator<Item = OutgoingArc> + '_ {
        (0..self.num_active.value(timestamp) as usize)
            .map(move |position| self.arcs[self.arc_at[position].value(timestamp) as usize])
    }

    /// Every arc, regardless of whether it is active.
    pub(crate) fn all_arcs(&self) -> impl Iterator<Item = OutgoingArc> + '_ {
        self.arcs.iter().copied()
    }

    pub(crate) fn commit_if(&mut self, timestamp: Timestamp) {
        self.num_active.commit_if(timestamp);
        self.positions
            .iter_mut()
            .chain(self.arc_at.iter_mut())
            .for_each(|cell| cell.commit_if(timestamp));
    }

    /// Moves the arc with `index` to `position`, and the arc at `position` to the old position
    /// of `index`.
    fn swap_positions(&mut self, timestamp: Timestamp, index: usize, position: usize) {
        let old_position = self.positions[index].value(timestamp);
        let displaced = self.arc_at[position].value(timestamp);

        self.arc_at[position].set_value(timestamp, index as i64);
        self.arc_at[old_position as usize].set_value(timestamp, displaced);
        self.positions[index].set_value(timestamp, position as i64);
        self.positions[displaced as usize].set_value(timestamp, old_position);
    }
}
