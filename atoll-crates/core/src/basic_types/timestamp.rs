/// A logical point in time of the engine.
///
/// The solver owns exactly one current timestamp, which only ever increases. Every move starts a
/// new timestamp; pending values tagged with an older timestamp are thereby discarded without
/// being touched.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The timestamp which is never current; cells tagged with it hold no pending value.
    pub const NULL: Timestamp = Timestamp(0);

    pub fn unpack(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Timestamp {
        Timestamp(self.0 + 1)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}
