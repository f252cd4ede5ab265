use crate::containers::StorageKey;

/// An identifier to an invariant registered with the solver.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct InvariantId(pub(crate) u32);

impl std::fmt::Display for InvariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvariantId({})", self.0)
    }
}

impl StorageKey for InvariantId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        InvariantId(index as u32)
    }
}
