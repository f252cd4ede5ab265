//! Checks shared by the tests of the invariants: the values an invariant produces are compared
//! against a plain function of its inputs, both exhaustively and along random move sequences.
use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::engine::OutputToInputMarkingMode;
use crate::engine::PropagationMode;
use crate::engine::Solver;
use crate::engine::SolverOptions;
use crate::propagation::VarViewId;

/// Every supported combination of propagation mode and marking mode.
pub(crate) fn all_options() -> Vec<SolverOptions> {
    let mut options = vec![SolverOptions {
        propagation_mode: PropagationMode::InputToOutput,
        output_to_input_marking_mode: OutputToInputMarkingMode::None,
    }];
    options.extend(
        [
            OutputToInputMarkingMode::None,
            OutputToInputMarkingMode::OutputToInputStatic,
            OutputToInputMarkingMode::InputToOutputExploration,
        ]
        .into_iter()
        .map(|output_to_input_marking_mode| SolverOptions {
            propagation_mode: PropagationMode::OutputToInput,
            output_to_input_marking_mode,
        }),
    );
    options
}

fn probe(solver: &mut Solver, outputs: &[VarViewId]) {
    solver.begin_probe().unwrap();
    for &output in outputs {
        solver.query(output).unwrap();
    }
    solver.end_probe().unwrap();
}

fn current_values(solver: &Solver, ids: &[VarViewId]) -> Vec<i64> {
    ids.iter().map(|&id| solver.current_value(id)).collect()
}

fn committed_values(solver: &Solver, ids: &[VarViewId]) -> Vec<i64> {
    ids.iter().map(|&id| solver.committed_value(id)).collect()
}

/// Probes every assignment of `inputs` within their domains and checks that the outputs equal
/// `expected` and lie within their bounds. With `tight`, every bound must also be reached by some
/// assignment.
pub(crate) fn check_exhaustively(
    solver: &mut Solver,
    inputs: &[VarViewId],
    outputs: &[VarViewId],
    expected: impl Fn(&[i64]) -> Vec<i64>,
    tight: bool,
) {
    let mut reached = outputs
        .iter()
        .map(|_| (i64::MAX, i64::MIN))
        .collect::<Vec<_>>();

    for assignment in inputs
        .iter()
        .map(|&input| solver.lower_bound(input)..=solver.upper_bound(input))
        .multi_cartesian_product()
    {
        solver.begin_move().unwrap();
        for (&input, &value) in inputs.iter().zip(assignment.iter()) {
            solver.set_value(input, value).unwrap();
        }
        solver.end_move().unwrap();
        probe(solver, outputs);

        let values = current_values(solver, outputs);
        assert_eq!(values, expected(&assignment), "inputs {assignment:?}");

        for ((&output, &value), reached) in outputs.iter().zip(values.iter()).zip(reached.iter_mut()) {
            assert!(
                solver.lower_bound(output) <= value && value <= solver.upper_bound(output),
                "{output} = {value} is outside [{}, {}] for inputs {assignment:?}",
                solver.lower_bound(output),
                solver.upper_bound(output)
            );
            reached.0 = reached.0.min(value);
            reached.1 = reached.1.max(value);
        }
    }

    if tight {
        for (&output, &(min, max)) in outputs.iter().zip(reached.iter()) {
            assert_eq!((solver.lower_bound(output), solver.upper_bound(output)), (min, max));
        }
    }
}

/// Performs random moves over `inputs`, probing after every move and committing about half of
/// them, and checks the outputs against `expected` after every step.
pub(crate) fn check_randomly(
    solver: &mut Solver,
    inputs: &[VarViewId],
    outputs: &[VarViewId],
    expected: impl Fn(&[i64]) -> Vec<i64>,
    seed: u64,
    num_steps: usize,
) {
    let mut rng = SmallRng::seed_from_u64(seed);

    for step in 0..num_steps {
        solver.begin_move().unwrap();
        let num_changes = rng.gen_range(1..=inputs.len().min(3));
        for _ in 0..num_changes {
            let input = inputs[rng.gen_range(0..inputs.len())];
            let value = rng.gen_range(solver.lower_bound(input)..=solver.upper_bound(input));
            solver.set_value(input, value).unwrap();
        }
        solver.end_move().unwrap();

        probe(solver, outputs);
        let input_values = current_values(solver, inputs);
        assert_eq!(
            current_values(solver, outputs),
            expected(&input_values),
            "step {step} with inputs {input_values:?}"
        );

        if rng.gen_bool(0.5) {
            solver.begin_commit().unwrap();
            solver.end_commit().unwrap();

            let committed_inputs = committed_values(solver, inputs);
            assert_eq!(committed_inputs, input_values);
            assert_eq!(
                committed_values(solver, outputs),
                expected(&committed_inputs),
                "commit at step {step}"
            );
        }
    }
}
