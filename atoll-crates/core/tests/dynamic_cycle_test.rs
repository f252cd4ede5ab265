#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use atoll_core::invariants::ElementVar;
use atoll_core::invariants::Linear;
use atoll_core::propagation::VarViewId;
use atoll_core::EngineError;
use atoll_core::Solver;
use atoll_core::SolverOptions;
use atoll_core::SolverState;
use helpers::all_options;
use helpers::commit;
use helpers::init_logging;
use helpers::make_move;
use helpers::probe;

/// `x = [a, y][i]` and `y = [b, x][j]`, with `total = x + y` reading the cycle.
struct Model {
    a: VarViewId,
    b: VarViewId,
    i: VarViewId,
    j: VarViewId,
    x: VarViewId,
    y: VarViewId,
    total: VarViewId,
}

fn build_model(
    options: SolverOptions,
    i: i64,
    j: i64,
) -> (Solver, Model, Result<(), EngineError>) {
    let mut solver = Solver::new(options);
    solver.open().unwrap();

    let a = solver.make_int_var(1, 0, 3).unwrap();
    let b = solver.make_int_var(5, 5, 9).unwrap();
    let i = solver.make_int_var(i, 0, 1).unwrap();
    let j = solver.make_int_var(j, 0, 1).unwrap();
    let x = solver.make_int_var(0, 0, 0).unwrap();
    let y = solver.make_int_var(0, 0, 0).unwrap();
    let total = solver.make_int_var(0, 0, 0).unwrap();

    let _ = solver
        .make_invariant(ElementVar::new(x, i, vec![a, y], 0))
        .unwrap();
    let _ = solver
        .make_invariant(ElementVar::new(y, j, vec![b, x], 0))
        .unwrap();
    let _ = solver
        .make_invariant(Linear::new(total, vec![1, 1], vec![x, y]))
        .unwrap();

    let result = solver.close();
    let model = Model {
        a,
        b,
        i,
        j,
        x,
        y,
        total,
    };
    (solver, model, result)
}

/// The values of `x` and `y`, given that `i` and `j` do not both select the other variable.
fn expected(a: i64, b: i64, i: i64, j: i64) -> (i64, i64) {
    match (i, j) {
        (0, 0) => (a, b),
        (0, _) => (a, a),
        _ => (b, b),
    }
}

#[test]
fn a_cycle_through_dynamic_inputs_can_be_closed() {
    init_logging();

    let (solver, model, result) = build_model(SolverOptions::default(), 0, 1);

    assert_eq!(result, Ok(()));
    let x_invariant = solver.defining_invariant(model.x).unwrap();
    let y_invariant = solver.defining_invariant(model.y).unwrap();
    let total_invariant = solver.defining_invariant(model.total).unwrap();
    assert_eq!(solver.layer(x_invariant), solver.layer(y_invariant));
    assert!(solver.layer(total_invariant) > solver.layer(x_invariant));

    assert_eq!(solver.committed_value(model.x), 1);
    assert_eq!(solver.committed_value(model.y), 1);
    assert_eq!(solver.committed_value(model.total), 2);
    for id in [model.x, model.y] {
        assert_eq!((solver.lower_bound(id), solver.upper_bound(id)), (0, 9));
    }
}

#[test]
fn inactive_cycles_propagate_in_every_mode() {
    init_logging();

    for options in all_options() {
        let (mut solver, model, result) = build_model(options, 0, 1);
        assert_eq!(result, Ok(()));

        let mut step = 0;
        for a in 0..=3 {
            for b in [5, 9] {
                for (i, j) in [(0, 0), (1, 0), (0, 1)] {
                    step += 1;
                    make_move(
                        &mut solver,
                        &[(model.a, a), (model.b, b), (model.i, i), (model.j, j)],
                    );
                    let (x, y) = expected(a, b, i, j);

                    probe(&mut solver, &[model.x, model.y, model.total]);
                    assert_eq!(
                        (
                            solver.current_value(model.x),
                            solver.current_value(model.y),
                            solver.current_value(model.total)
                        ),
                        (x, y, x + y),
                        "a = {a}, b = {b}, i = {i}, j = {j} with {options:?}"
                    );

                    if step % 2 == 0 {
                        commit(&mut solver);
                        assert_eq!(
                            (
                                solver.committed_value(model.x),
                                solver.committed_value(model.y),
                                solver.committed_value(model.total)
                            ),
                            (x, y, x + y),
                            "commit of a = {a}, b = {b}, i = {i}, j = {j} with {options:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn an_active_cycle_fails_propagation_until_the_next_move() {
    init_logging();

    for options in all_options() {
        let (mut solver, model, result) = build_model(options, 0, 0);
        assert_eq!(result, Ok(()));
        assert_eq!(solver.committed_value(model.total), 6);

        make_move(&mut solver, &[(model.i, 1), (model.j, 1)]);
        solver.begin_probe().unwrap();
        solver.query(model.x).unwrap();
        let result = solver.end_probe();
        assert!(
            matches!(&result, Err(EngineError::DynamicCycle { invariants }) if invariants.len() == 2),
            "{result:?} with {options:?}"
        );
        assert_eq!(solver.state(), SolverState::Idle);

        solver.begin_commit().unwrap();
        assert!(matches!(
            solver.end_commit(),
            Err(EngineError::DynamicCycle { .. })
        ));
        assert_eq!(solver.state(), SolverState::Idle);
        assert_eq!(solver.committed_value(model.x), 1);
        assert_eq!(solver.committed_value(model.y), 5);
        assert_eq!(solver.committed_value(model.i), 0);

        make_move(&mut solver, &[(model.b, 7), (model.i, 1), (model.j, 0)]);
        commit(&mut solver);
        assert_eq!(solver.committed_value(model.x), 7);
        assert_eq!(solver.committed_value(model.y), 7);
        assert_eq!(solver.committed_value(model.total), 14);
    }
}

#[test]
fn closing_with_an_active_cycle_keeps_the_solver_open() {
    init_logging();

    let (solver, _, result) = build_model(SolverOptions::default(), 1, 1);

    assert!(matches!(result, Err(EngineError::DynamicCycle { .. })));
    assert!(solver.is_open());
    assert!(!solver.is_closed());
}
