use thiserror::Error;

#[cfg(doc)]
use crate::Solver;
use crate::engine::SolverState;
use crate::propagation::InvariantId;
use crate::propagation::VarId;
use crate::propagation::VarViewId;
use crate::propagation::ViewId;

/// Errors which are the result of misusing the [`Solver`] or of an inconsistent model.
///
/// A call which returns an error leaves the solver unchanged, except for
/// [`EngineError::DynamicCycle`]: the probe or commit which returns it is abandoned, and the
/// uncommitted values of the move are no longer meaningful. The committed state is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// [`Solver::open`] was called on a solver which is already open.
    #[error("The solver is already open")]
    SolverAlreadyOpen,
    /// The operation requires an open solver, but the solver was never opened.
    #[error("The solver has not been opened")]
    SolverNotOpen,
    /// The operation is only allowed before [`Solver::close`].
    #[error("The solver is closed")]
    SolverClosed,
    /// A transaction operation was issued in a state which does not allow it.
    #[error("Cannot {operation} while the solver is in state {state}")]
    InvalidState {
        operation: &'static str,
        state: SolverState,
    },
    /// A second invariant attempted to define a variable.
    #[error("Variable {var} is already defined by invariant {defined_by}")]
    VarAlreadyDefined { var: VarId, defined_by: InvariantId },
    /// Views are functions of their parent and cannot be defined by an invariant.
    #[error("View {0} cannot be defined by an invariant")]
    DefinedVarIsView(ViewId),
    /// The bounds of a view are derived from its parent and cannot be set.
    #[error("The bounds of view {0} are derived from its parent")]
    BoundsOfView(ViewId),
    /// An invariant registered one of its own defined variables as an input.
    #[error("Invariant {invariant} both reads and defines variable {var}")]
    SelfDependency { invariant: InvariantId, var: VarId },
    /// The static dependencies between invariants contain a cycle.
    #[error("The dependency graph contains a cycle through invariants {invariants:?}")]
    CyclicDependency { invariants: Vec<InvariantId> },
    /// The active inputs of the invariants form a cycle at the current timestamp.
    ///
    /// Cycles through dynamic inputs are allowed in a model, as long as they are never active
    /// all at once.
    #[error("Invariants {invariants:?} depend on each other through their active inputs")]
    DynamicCycle { invariants: Vec<InvariantId> },
    /// The arguments of an invariant or view do not fit together.
    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments {
        name: &'static str,
        reason: &'static str,
    },
    /// A domain or intermediate value does not fit into the range the engine supports.
    #[error("{what} overflows")]
    Overflow { what: &'static str },
    /// The id does not refer to a variable or view of this solver.
    #[error("{0} does not exist")]
    UnknownId(VarViewId),
    /// Only search variables (variables without a defining invariant) can be assigned.
    #[error("{0} is not a search variable")]
    NotASearchVar(VarViewId),
    /// The lower bound exceeds the upper bound.
    #[error("The domain [{lower_bound}, {upper_bound}] is empty")]
    EmptyDomain { lower_bound: i64, upper_bound: i64 },
    /// A value lies outside the domain of the variable it is assigned to.
    #[error("Value {value} is outside the domain [{lower_bound}, {upper_bound}]")]
    ValueOutOfDomain {
        value: i64,
        lower_bound: i64,
        upper_bound: i64,
    },
}
