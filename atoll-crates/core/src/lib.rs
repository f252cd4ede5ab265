//! # Atoll
//! Atoll is an incremental constraint-propagation engine, intended as the computational core of a
//! local-search constraint solver.
//!
//! A model consists of integer variables, views (pure functions of one other variable or view)
//! and invariants. Every invariant defines one or more variables as a function of its inputs; a
//! variable without a defining invariant is a *search variable* which the caller assigns directly.
//! After the model is closed, the caller repeatedly performs transactions:
//! - a **move** tentatively assigns search variables;
//! - a **probe** propagates just enough to make the queried variables correct, without changing
//!   the committed state;
//! - a **commit** propagates the move and makes it the new committed state.
//!
//! Propagation is either eager ([`PropagationMode::InputToOutput`]), visiting every affected
//! invariant in dependency order, or lazy ([`PropagationMode::OutputToInput`]), walking backward
//! from the queried variables and visiting only the inputs that are currently relevant.
//!
//! # Example
//! ```rust
//! # use atoll_core::Solver;
//! # use atoll_core::invariants::Linear;
//! let mut solver = Solver::default();
//! solver.open().unwrap();
//!
//! let a = solver.make_int_var(0, 0, 10).unwrap();
//! let b = solver.make_int_var(0, 0, 10).unwrap();
//! let c = solver.make_int_var(0, 0, 10).unwrap();
//! let s = solver.make_int_var(0, 0, 0).unwrap();
//! let _ = solver
//!     .make_invariant(Linear::new(s, vec![1, 2, -1], vec![a, b, c]))
//!     .unwrap();
//! solver.close().unwrap();
//!
//! assert_eq!(solver.lower_bound(s), -10);
//! assert_eq!(solver.upper_bound(s), 30);
//!
//! solver.begin_move().unwrap();
//! solver.set_value(a, 1).unwrap();
//! solver.set_value(b, 2).unwrap();
//! solver.end_move().unwrap();
//!
//! solver.begin_probe().unwrap();
//! solver.query(s).unwrap();
//! solver.end_probe().unwrap();
//!
//! assert_eq!(solver.current_value(s), 5);
//! assert_eq!(solver.committed_value(s), 0);
//! ```
pub(crate) mod atoll_asserts;
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub mod invariants;
pub mod propagation;
pub mod statistics;
pub mod views;
pub mod violation_invariants;

pub use convert_case;

pub use crate::basic_types::EngineError;
pub use crate::basic_types::Timestamp;
pub use crate::engine::InvariantHandle;
pub use crate::engine::OutputToInputMarkingMode;
pub use crate::engine::PropagationMode;
pub use crate::engine::Solver;
pub use crate::engine::SolverOptions;
pub use crate::engine::SolverState;
