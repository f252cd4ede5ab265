use crate::propagation::IntView;
use crate::propagation::VarViewId;

/// Converts a Boolean in violation form, where `0` is true, to an integer where `1` is true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bool2IntView {
    parent: VarViewId,
}

impl Bool2IntView {
    pub fn new(parent: VarViewId) -> Self {
        Bool2IntView { parent }
    }
}

impl IntView for Bool2IntView {
    fn name(&self) -> &str {
        "Bool2IntView"
    }

    fn parent(&self) -> VarViewId {
        self.parent
    }

    fn compute(&self, parent_value: i64) -> i64 {
        i64::from(parent_value == 0)
    }

    fn compute_bounds(&self, parent_lower_bound: i64, parent_upper_bound: i64) -> (i64, i64) {
        if parent_lower_bound == 0 && parent_upper_bound == 0 {
            (1, 1)
        } else if 0 < parent_lower_bound || parent_upper_bound < 0 {
            (0, 0)
        } else {
            (0, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bool2IntView;
    use crate::engine::test_helpers::check_exhaustively;
    use crate::engine::Solver;

    #[test]
    fn bool2int_matches_its_definition() {
        let mut solver = Solver::default();
        solver.open().unwrap();
        let x = solver.make_int_var(0, 0, 3).unwrap();
        let as_int = solver.make_int_view(Bool2IntView::new(x)).unwrap();
        solver.close().unwrap();

        assert_eq!(solver.committed_value(as_int), 1);
        check_exhaustively(
            &mut solver,
            &[x],
            &[as_int],
            |values: &[i64]| vec![i64::from(values[0] == 0)],
            true,
        );
    }
}
