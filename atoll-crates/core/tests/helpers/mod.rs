//! Shared setup for the integration tests of the engine.
#![allow(
    dead_code,
    reason = "every test binary uses a different subset of the helpers"
)]

use atoll_core::propagation::VarViewId;
use atoll_core::OutputToInputMarkingMode;
use atoll_core::PropagationMode;
use atoll_core::Solver;
use atoll_core::SolverOptions;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every supported combination of propagation mode and marking mode.
pub(crate) fn all_options() -> Vec<SolverOptions> {
    let mut options = vec![SolverOptions::default()];
    for output_to_input_marking_mode in [
        OutputToInputMarkingMode::None,
        OutputToInputMarkingMode::OutputToInputStatic,
        OutputToInputMarkingMode::InputToOutputExploration,
    ] {
        options.push(SolverOptions {
            propagation_mode: PropagationMode::OutputToInput,
            output_to_input_marking_mode,
        });
    }
    options
}

/// Performs a move which assigns `assignments`.
pub(crate) fn make_move(solver: &mut Solver, assignments: &[(VarViewId, i64)]) {
    solver.begin_move().unwrap();
    for &(id, value) in assignments {
        solver.set_value(id, value).unwrap();
    }
    solver.end_move().unwrap();
}

/// Probes the current move, querying `queries`.
pub(crate) fn probe(solver: &mut Solver, queries: &[VarViewId]) {
    solver.begin_probe().unwrap();
    for &id in queries {
        solver.query(id).unwrap();
    }
    solver.end_probe().unwrap();
}

pub(crate) fn commit(solver: &mut Solver) {
    solver.begin_commit().unwrap();
    solver.end_commit().unwrap();
}
