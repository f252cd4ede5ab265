/// The transaction state of a [`Solver`](crate::Solver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// No transaction is in progress.
    Idle,
    /// Variables, views and invariants can be registered.
    Open,
    /// Search variables can be assigned.
    Move,
    /// Variables can be queried; nothing will be committed.
    Probe,
    /// Variables can be queried; the move will be committed.
    Commit,
    /// A propagation is running.
    Processing,
}

impl std::fmt::Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverState::Idle => write!(f, "idle"),
            SolverState::Open => write!(f, "open"),
            SolverState::Move => write!(f, "move"),
            SolverState::Probe => write!(f, "probe"),
            SolverState::Commit => write!(f, "commit"),
            SolverState::Processing => write!(f, "processing"),
        }
    }
}
