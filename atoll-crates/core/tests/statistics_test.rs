#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use atoll_core::convert_case::Case;
use atoll_core::invariants::Linear;
use atoll_core::statistics::configure_statistic_logging;
use atoll_core::statistics::should_log_statistics;
use atoll_core::Solver;
use helpers::commit;
use helpers::make_move;
use helpers::probe;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn engine_statistics_are_written_to_the_configured_writer() {
    let buffer = SharedBuffer::default();
    assert!(!should_log_statistics());
    configure_statistic_logging(
        "%%mzn-stat:",
        Some("%%mzn-stat-end"),
        Some(Case::Camel),
        Some(Box::new(buffer.clone())),
    );
    assert!(should_log_statistics());

    let mut solver = Solver::default();
    solver.open().unwrap();
    let x = solver.make_int_var(0, 0, 5).unwrap();
    let s = solver.make_int_var(0, 0, 0).unwrap();
    let _ = solver
        .make_invariant(Linear::new(s, vec![2], vec![x]))
        .unwrap();
    solver.close().unwrap();

    make_move(&mut solver, &[(x, 1)]);
    probe(&mut solver, &[s]);
    make_move(&mut solver, &[(x, 2)]);
    commit(&mut solver);
    solver.log_statistics();

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines = output.lines().collect::<Vec<_>>();
    assert!(lines.contains(&"%%mzn-stat: engineNumMoves=2"));
    assert!(lines.contains(&"%%mzn-stat: engineNumProbes=1"));
    assert!(lines.contains(&"%%mzn-stat: engineNumCommits=1"));
    assert_eq!(lines.last(), Some(&"%%mzn-stat-end"));
}
