#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use atoll_core::invariants::Linear;
use atoll_core::views::IntOffsetView;
use atoll_core::EngineError;
use atoll_core::OutputToInputMarkingMode;
use atoll_core::PropagationMode;
use atoll_core::Solver;
use atoll_core::SolverState;
use helpers::init_logging;
use helpers::make_move;

#[test]
fn the_solver_must_be_opened_exactly_once() {
    init_logging();

    let mut solver = Solver::default();
    assert_eq!(solver.make_int_var(0, 0, 1), Err(EngineError::SolverNotOpen));

    solver.open().unwrap();
    assert!(solver.is_open());
    assert_eq!(solver.open(), Err(EngineError::SolverAlreadyOpen));

    solver.close().unwrap();
    assert!(solver.is_closed());
    assert_eq!(solver.state(), SolverState::Idle);
    assert_eq!(solver.open(), Err(EngineError::SolverClosed));
    assert_eq!(solver.make_int_var(0, 0, 1), Err(EngineError::SolverClosed));
    assert_eq!(solver.close(), Err(EngineError::SolverClosed));
}

#[test]
fn transactions_require_a_closed_solver_in_the_right_state() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 3).unwrap();
    assert!(matches!(
        solver.begin_move(),
        Err(EngineError::InvalidState { .. })
    ));
    solver.close().unwrap();

    assert_eq!(
        solver.query(x),
        Err(EngineError::InvalidState {
            operation: "query",
            state: SolverState::Idle,
        })
    );
    assert!(matches!(
        solver.set_value(x, 1),
        Err(EngineError::InvalidState { .. })
    ));
    assert!(matches!(
        solver.end_probe(),
        Err(EngineError::InvalidState { .. })
    ));

    solver.begin_move().unwrap();
    assert!(matches!(
        solver.begin_probe(),
        Err(EngineError::InvalidState { .. })
    ));
    assert!(matches!(
        solver.begin_move(),
        Err(EngineError::InvalidState { .. })
    ));
    solver.end_move().unwrap();
    assert_eq!(solver.state(), SolverState::Idle);
}

#[test]
fn only_search_vars_can_be_assigned_within_their_domain() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 10).unwrap();
    let s = solver.make_int_var(0, 0, 0).unwrap();
    let view = solver.make_int_view(IntOffsetView::new(x, 3)).unwrap();
    let _ = solver
        .make_invariant(Linear::new(s, vec![1], vec![x]))
        .unwrap();
    solver.close().unwrap();

    assert_eq!(solver.search_vars(), &[x.as_var().unwrap()]);

    solver.begin_move().unwrap();
    assert_eq!(solver.set_value(s, 1), Err(EngineError::NotASearchVar(s)));
    assert_eq!(
        solver.set_value(view, 4),
        Err(EngineError::NotASearchVar(view))
    );
    assert_eq!(
        solver.set_value(x, 11),
        Err(EngineError::ValueOutOfDomain {
            value: 11,
            lower_bound: 0,
            upper_bound: 10,
        })
    );
    solver.set_value(x, 10).unwrap();
    solver.end_move().unwrap();

    assert_eq!(solver.current_value(view), 13);
    assert_eq!(
        solver.modified_search_vars().collect::<Vec<_>>(),
        vec![x.as_var().unwrap()]
    );
}

#[test]
fn invalid_domains_are_rejected() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    assert_eq!(
        solver.make_int_var(0, 5, 1),
        Err(EngineError::EmptyDomain {
            lower_bound: 5,
            upper_bound: 1,
        })
    );
    assert_eq!(
        solver.make_int_var(7, 0, 5),
        Err(EngineError::ValueOutOfDomain {
            value: 7,
            lower_bound: 0,
            upper_bound: 5,
        })
    );

    let x = solver.make_int_var(2, 0, 5).unwrap();
    let view = solver.make_int_view(IntOffsetView::new(x, 1)).unwrap();
    assert_eq!(
        solver.update_bounds(x, 4, 3, false),
        Err(EngineError::EmptyDomain {
            lower_bound: 4,
            upper_bound: 3,
        })
    );
    assert_eq!(
        solver.update_bounds(view, 0, 10, false),
        Err(EngineError::BoundsOfView(view.as_view().unwrap()))
    );

    solver.update_bounds(x, 1, 3, false).unwrap();
    assert_eq!((solver.lower_bound(view), solver.upper_bound(view)), (2, 4));
    solver.update_bounds(x, 0, 2, true).unwrap();
    assert_eq!((solver.lower_bound(x), solver.upper_bound(x)), (0, 3));
}

#[test]
fn inconsistent_registrations_are_rejected() {
    init_logging();

    let mut other = Solver::default();
    other.open().unwrap();
    let foreign = (0..5)
        .map(|_| other.make_int_var(0, 0, 1).unwrap())
        .last()
        .unwrap();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 5).unwrap();
    let s = solver.make_int_var(0, 0, 0).unwrap();
    let view = solver.make_int_view(IntOffsetView::new(s, 1)).unwrap();

    assert_eq!(
        solver
            .make_invariant(Linear::new(s, vec![1], vec![foreign]))
            .map(|handle| handle.id()),
        Err(EngineError::UnknownId(foreign))
    );
    assert_eq!(
        solver
            .make_invariant(Linear::new(view, vec![1], vec![x]))
            .map(|handle| handle.id()),
        Err(EngineError::DefinedVarIsView(view.as_view().unwrap()))
    );
    assert!(matches!(
        solver.make_invariant(Linear::new(s, vec![1, 1], vec![x, view])),
        Err(EngineError::SelfDependency { .. })
    ));
    assert_eq!(solver.num_invariants(), 0);

    let first = solver
        .make_invariant(Linear::new(s, vec![1], vec![x]))
        .unwrap();
    assert_eq!(
        solver
            .make_invariant(Linear::new(s, vec![2], vec![x]))
            .map(|handle| handle.id()),
        Err(EngineError::VarAlreadyDefined {
            var: s.as_var().unwrap(),
            defined_by: first.id(),
        })
    );
    assert_eq!(solver.num_invariants(), 1);

    solver.close().unwrap();
    assert_eq!(solver.committed_value(view), 1);
}

#[test]
fn cyclic_models_cannot_be_closed() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(1, 0, 5).unwrap();
    let a = solver.make_int_var(0, 0, 0).unwrap();
    let b = solver.make_int_var(0, 0, 0).unwrap();
    let _ = solver
        .make_invariant(Linear::new(a, vec![1, 1], vec![x, b]))
        .unwrap();
    let _ = solver
        .make_invariant(Linear::new(b, vec![1], vec![a]))
        .unwrap();

    assert!(matches!(
        solver.compute_bounds(),
        Err(EngineError::CyclicDependency { .. })
    ));
    assert!(matches!(
        solver.close(),
        Err(EngineError::CyclicDependency { .. })
    ));
    assert!(solver.is_open());
}

#[test]
fn computed_bounds_follow_changed_input_domains() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 5).unwrap();
    let s = solver.make_int_var(0, 0, 0).unwrap();
    let t = solver.make_int_var(0, 0, 0).unwrap();
    let _ = solver
        .make_invariant(Linear::new(t, vec![1], vec![s]))
        .unwrap();
    let _ = solver
        .make_invariant(Linear::new(s, vec![2], vec![x]))
        .unwrap();
    assert_eq!((solver.lower_bound(s), solver.upper_bound(s)), (0, 10));

    solver.update_bounds(x, -1, 20, false).unwrap();
    solver.compute_bounds().unwrap();
    assert_eq!((solver.lower_bound(s), solver.upper_bound(s)), (-2, 40));
    assert_eq!((solver.lower_bound(t), solver.upper_bound(t)), (-2, 40));

    // Computed bounds only ever widen.
    solver.update_bounds(x, 0, 1, false).unwrap();
    solver.compute_bounds().unwrap();
    assert_eq!((solver.lower_bound(s), solver.upper_bound(s)), (-2, 40));
}

#[test]
fn modes_are_fixed_once_the_solver_is_closed() {
    init_logging();

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 3).unwrap();
    solver
        .set_propagation_mode(PropagationMode::OutputToInput)
        .unwrap();
    solver
        .set_output_to_input_marking_mode(OutputToInputMarkingMode::InputToOutputExploration)
        .unwrap();
    solver.close().unwrap();

    assert_eq!(solver.propagation_mode(), PropagationMode::OutputToInput);
    assert_eq!(
        solver.set_propagation_mode(PropagationMode::InputToOutput),
        Err(EngineError::SolverClosed)
    );
    assert_eq!(
        solver.set_output_to_input_marking_mode(OutputToInputMarkingMode::None),
        Err(EngineError::SolverClosed)
    );
    assert_eq!(
        solver.output_to_input_marking_mode(),
        OutputToInputMarkingMode::InputToOutputExploration
    );

    make_move(&mut solver, &[(x, 2)]);
    assert_eq!(solver.current_value(x), 2);
}
