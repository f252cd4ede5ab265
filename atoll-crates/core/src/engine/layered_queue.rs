use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::atoll_asserts::atoll_assert_moderate;
use crate::containers::KeyedVec;
use crate::propagation::InvariantId;
use crate::propagation::LocalId;

/// The queue of eager propagation: invariants are popped in non-decreasing layer order, together
/// with the inputs that changed since they were enqueued.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayeredQueue {
    queues: Vec<VecDeque<InvariantId>>,
    is_enqueued: KeyedVec<InvariantId, bool>,
    changed_inputs: KeyedVec<InvariantId, Vec<LocalId>>,
    num_enqueued: usize,
    present_layers: BinaryHeap<Reverse<usize>>,
}

impl LayeredQueue {
    pub(crate) fn new(num_layers: usize, num_invariants: usize) -> LayeredQueue {
        LayeredQueue {
            queues: vec![VecDeque::new(); num_layers],
            is_enqueued: KeyedVec::filled(num_invariants, false),
            changed_inputs: KeyedVec::filled(num_invariants, vec![]),
            num_enqueued: 0,
            present_layers: BinaryHeap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    /// Records that input `local_id` of the invariant changed, and enqueues the invariant if it
    /// was not enqueued yet.
    pub(crate) fn enqueue(&mut self, invariant_id: InvariantId, layer: usize, local_id: LocalId) {
        atoll_assert_moderate!(layer < self.queues.len());

        self.changed_inputs[invariant_id].push(local_id);

        if !self.is_enqueued[invariant_id] {
            self.is_enqueued[invariant_id] = true;
            self.num_enqueued += 1;

            if self.queues[layer].is_empty() {
                self.present_layers.push(Reverse(layer));
            }
            self.queues[layer].push_back(invariant_id);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<InvariantId> {
        let Reverse(top_layer) = *self.present_layers.peek()?;
        atoll_assert_moderate!(!self.queues[top_layer].is_empty());

        let next_invariant_id = self.queues[top_layer].pop_front();

        if let Some(invariant_id) = next_invariant_id {
            self.is_enqueued[invariant_id] = false;
            self.num_enqueued -= 1;
        }

        if self.queues[top_layer].is_empty() {
            let _ = self.present_layers.pop();
        }

        next_invariant_id
    }

    /// Takes the invariant out of the queue, forgetting its changed inputs. Returns whether it was
    /// enqueued.
    ///
    /// Only invariants in the lowest enqueued layer can be removed.
    pub(crate) fn remove(&mut self, invariant_id: InvariantId, layer: usize) -> bool {
        if !self.is_enqueued[invariant_id] {
            return false;
        }
        atoll_assert_moderate!(self.present_layers.peek() == Some(&Reverse(layer)));

        self.queues[layer].retain(|&enqueued| enqueued != invariant_id);
        self.is_enqueued[invariant_id] = false;
        self.changed_inputs[invariant_id].clear();
        self.num_enqueued -= 1;

        if self.queues[layer].is_empty() {
            let _ = self.present_layers.pop();
        }
        true
    }

    /// Moves the changed inputs of the invariant into `buffer`, sorted and without duplicates.
    pub(crate) fn take_changed_inputs(&mut self, invariant_id: InvariantId, buffer: &mut Vec<LocalId>) {
        buffer.clear();
        buffer.append(&mut self.changed_inputs[invariant_id]);
        buffer.sort_unstable();
        buffer.dedup();
    }

    pub(crate) fn clear(&mut self) {
        while let Some(Reverse(layer)) = self.present_layers.pop() {
            for invariant_id in self.queues[layer].drain(..) {
                self.is_enqueued[invariant_id] = false;
                self.changed_inputs[invariant_id].clear();
            }
        }

        self.num_enqueued = 0;
    }
}
