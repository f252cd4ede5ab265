use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

use super::VariableStore;
use crate::containers::KeyedVec;
use crate::containers::Slot;
use crate::propagation::Invariant;
use crate::propagation::InvariantId;

/// The single owner of all variables, views and invariants of a solver.
///
/// The two halves are separate fields so that an invariant can be evaluated while it writes to
/// the variables.
#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) variables: VariableStore,
    pub(crate) invariants: InvariantStore,
}

/// A central store for invariants.
#[derive(Default)]
pub(crate) struct InvariantStore {
    invariants: KeyedVec<InvariantId, Box<dyn Invariant>>,
}

/// A typed wrapper around an [`InvariantId`] that allows retrieving the concrete invariant from
/// the solver.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InvariantHandle<T> {
    id: InvariantId,
    invariant: PhantomData<T>,
}

impl<T> InvariantHandle<T> {
    /// Get a type-erased id of the invariant.
    pub fn id(self) -> InvariantId {
        self.id
    }
}

impl<T> Clone for InvariantHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InvariantHandle<T> {}

impl InvariantStore {
    pub(crate) fn num_invariants(&self) -> usize {
        self.invariants.len()
    }

    pub(crate) fn new_invariant<T>(&mut self) -> NewInvariant<'_, T> {
        NewInvariant {
            underlying: self.invariants.new_slot(),
            invariant: PhantomData,
        }
    }

    pub(crate) fn get_invariant<T: Invariant>(&self, handle: InvariantHandle<T>) -> Option<&T> {
        self.invariants.get(handle.id)?.downcast_ref()
    }

    pub(crate) fn iter_invariants_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Box<dyn Invariant>> + '_ {
        self.invariants.iter_mut()
    }
}

impl Index<InvariantId> for InvariantStore {
    type Output = dyn Invariant;

    fn index(&self, index: InvariantId) -> &Self::Output {
        self.invariants[index].as_ref()
    }
}

impl IndexMut<InvariantId> for InvariantStore {
    fn index_mut(&mut self, index: InvariantId) -> &mut Self::Output {
        self.invariants[index].as_mut()
    }
}

/// A reserved slot for an invariant which is still being registered.
pub(crate) struct NewInvariant<'a, T> {
    underlying: Slot<'a, InvariantId, Box<dyn Invariant>>,
    invariant: PhantomData<T>,
}

impl<T: Invariant> NewInvariant<'_, T> {
    /// The id the invariant receives once the slot is populated.
    pub(crate) fn id(&self) -> InvariantId {
        self.underlying.key()
    }

    pub(crate) fn populate(self, invariant: T) -> InvariantHandle<T> {
        InvariantHandle {
            id: self.underlying.populate(Box::new(invariant)),
            invariant: PhantomData,
        }
    }
}

impl Debug for InvariantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let invariants: Vec<_> = self
            .invariants
            .iter()
            .map(|invariant| invariant.name())
            .collect();

        write!(f, "{invariants:?}")
    }
}
