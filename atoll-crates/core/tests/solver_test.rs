#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use atoll_core::invariants::Count;
use atoll_core::invariants::Element2dVar;
use atoll_core::invariants::Linear;
use atoll_core::propagation::VarViewId;
use atoll_core::Solver;
use helpers::all_options;
use helpers::commit;
use helpers::init_logging;
use helpers::make_move;
use helpers::probe;

#[test]
fn linear_sum_is_probed_and_committed() {
    init_logging();

    for options in all_options() {
        let mut solver = Solver::new(options);
        solver.open().unwrap();
        let a = solver.make_int_var(0, 0, 10).unwrap();
        let b = solver.make_int_var(0, 0, 10).unwrap();
        let c = solver.make_int_var(0, 0, 10).unwrap();
        let s = solver.make_int_var(0, 0, 0).unwrap();
        let handle = solver
            .make_invariant(Linear::new(s, vec![1, 2, -1], vec![a, b, c]))
            .unwrap();
        solver.close().unwrap();

        assert!(solver.invariant(handle).is_some());
        assert_eq!(solver.defining_invariant(s), Some(handle.id()));
        assert_eq!(solver.input_vars(handle.id()).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!((solver.lower_bound(s), solver.upper_bound(s)), (-10, 30));

        make_move(&mut solver, &[(a, 1), (b, 2), (c, 0)]);
        probe(&mut solver, &[s]);
        assert_eq!(solver.current_value(s), 5);
        assert_eq!(solver.committed_value(s), 0);

        commit(&mut solver);
        assert_eq!(solver.committed_value(s), 5);

        make_move(&mut solver, &[(b, 5)]);
        probe(&mut solver, &[s]);
        assert_eq!(solver.current_value(s), 11);
        assert_eq!(solver.committed_value(s), 5);
    }
}

#[test]
fn count_matches_brute_force_for_every_assignment() {
    init_logging();

    for options in all_options() {
        let mut solver = Solver::new(options);
        solver.open().unwrap();
        let inputs = (0..3)
            .map(|_| solver.make_int_var(2, 2, 5).unwrap())
            .collect::<Vec<_>>();
        let needle = solver.make_int_var(2, 2, 5).unwrap();
        let output = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Count::new(output, needle, inputs.clone()))
            .unwrap();
        solver.close().unwrap();
        assert_eq!(solver.committed_value(output), 3);

        for x1 in 2..=5 {
            for x2 in 2..=5 {
                for x3 in 2..=5 {
                    for n in 2..=5 {
                        make_move(
                            &mut solver,
                            &[(inputs[0], x1), (inputs[1], x2), (inputs[2], x3), (needle, n)],
                        );
                        probe(&mut solver, &[output]);

                        let expected = [x1, x2, x3].iter().filter(|&&x| x == n).count() as i64;
                        assert_eq!(
                            solver.current_value(output),
                            expected,
                            "inputs {x1}, {x2}, {x3} with needle {n}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn changing_the_indices_selects_the_committed_value_of_the_new_cell() {
    init_logging();

    for options in all_options() {
        let mut solver = Solver::new(options);
        solver.open().unwrap();
        let cells: Vec<VarViewId> = [10, 20, 30, 40]
            .into_iter()
            .map(|value| solver.make_int_var(value, 0, 50).unwrap())
            .collect();
        let row = solver.make_int_var(1, 1, 2).unwrap();
        let column = solver.make_int_var(1, 1, 2).unwrap();
        let output = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Element2dVar::new(
                output,
                row,
                column,
                vec![cells[0..2].to_vec(), cells[2..4].to_vec()],
                1,
                1,
            ))
            .unwrap();
        solver.close().unwrap();
        assert_eq!(solver.committed_value(output), 10);

        make_move(&mut solver, &[(row, 2), (column, 2)]);
        probe(&mut solver, &[output]);
        assert_eq!(solver.current_value(output), 40);

        // Changing a cell which is not selected has no effect.
        make_move(&mut solver, &[(cells[3], 0)]);
        probe(&mut solver, &[output]);
        assert_eq!(solver.current_value(output), 10);

        make_move(&mut solver, &[(row, 2), (cells[0], 0)]);
        commit(&mut solver);
        assert_eq!(solver.committed_value(output), 30);

        make_move(&mut solver, &[(cells[2], 35)]);
        probe(&mut solver, &[output]);
        assert_eq!(solver.current_value(output), 35);
    }
}

#[test]
fn chained_invariants_are_evaluated_in_dependency_order() {
    init_logging();

    for options in all_options() {
        let mut solver = Solver::new(options);
        solver.open().unwrap();
        let x = solver.make_int_var(1, 0, 5).unwrap();
        let y = solver.make_int_var(2, 0, 5).unwrap();
        let a = solver.make_int_var(0, 0, 0).unwrap();
        let b = solver.make_int_var(0, 0, 0).unwrap();
        let c = solver.make_int_var(0, 0, 0).unwrap();

        // Registered out of dependency order: c = a + b, b = 2a, a = x + y
        let top = solver
            .make_invariant(Linear::new(c, vec![1, 1], vec![a, b]))
            .unwrap();
        let middle = solver
            .make_invariant(Linear::new(b, vec![2], vec![a]))
            .unwrap();
        let bottom = solver
            .make_invariant(Linear::new(a, vec![1, 1], vec![x, y]))
            .unwrap();
        solver.close().unwrap();

        assert_eq!(solver.layer(bottom.id()), 1);
        assert_eq!(solver.layer(middle.id()), 2);
        assert_eq!(solver.layer(top.id()), 3);
        assert_eq!(solver.num_layers(), 4);
        assert_eq!((solver.lower_bound(c), solver.upper_bound(c)), (0, 30));
        assert_eq!(solver.committed_value(c), 9);
        assert_eq!(solver.evaluation_vars(), &[c.as_var().unwrap()]);

        make_move(&mut solver, &[(x, 4)]);
        probe(&mut solver, &[c]);
        assert_eq!(solver.current_value(c), 18);

        commit(&mut solver);
        assert_eq!(solver.committed_value(a), 6);
        assert_eq!(solver.committed_value(b), 12);
        assert_eq!(solver.committed_value(c), 18);
    }
}

#[test]
fn abandoned_moves_leave_no_trace() {
    init_logging();

    for options in all_options() {
        let mut solver = Solver::new(options);
        solver.open().unwrap();
        let x = solver.make_int_var(3, 0, 9).unwrap();
        let s = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Linear::new(s, vec![3], vec![x]))
            .unwrap();
        solver.close().unwrap();

        let timestamp = solver.current_timestamp();
        make_move(&mut solver, &[(x, 7)]);
        assert!(solver.current_timestamp() > timestamp);
        probe(&mut solver, &[s]);
        assert_eq!(solver.current_value(s), 21);

        make_move(&mut solver, &[]);
        assert_eq!(solver.current_value(x), 3);
        assert_eq!(solver.current_value(s), 9);
        assert_eq!(solver.modified_search_vars().count(), 0);

        // Committing an empty move changes nothing.
        commit(&mut solver);
        assert_eq!(solver.committed_value(s), 9);
    }
}
