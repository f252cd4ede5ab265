use crate::propagation::IntView;
use crate::propagation::VarViewId;

/// The violation of `parent == value`: `0` if it holds and `1` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EqualConst {
    parent: VarViewId,
    value: i64,
}

impl EqualConst {
    pub fn new(parent: VarViewId, value: i64) -> Self {
        EqualConst { parent, value }
    }
}

impl IntView for EqualConst {
    fn name(&self) -> &str {
        "EqualConst"
    }

    fn parent(&self) -> VarViewId {
        self.parent
    }

    fn compute(&self, parent_value: i64) -> i64 {
        i64::from(parent_value != self.value)
    }

    fn compute_bounds(&self, parent_lower_bound: i64, parent_upper_bound: i64) -> (i64, i64) {
        if parent_lower_bound == self.value && parent_upper_bound == self.value {
            (0, 0)
        } else if self.value < parent_lower_bound || parent_upper_bound < self.value {
            (1, 1)
        } else {
            (0, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EqualConst;
    use crate::engine::test_helpers::check_exhaustively;
    use crate::engine::Solver;

    #[test]
    fn equal_const_matches_its_definition() {
        let mut solver = Solver::default();
        solver.open().unwrap();
        let x = solver.make_int_var(0, -2, 2).unwrap();
        let inside = solver.make_int_view(EqualConst::new(x, 1)).unwrap();
        let outside = solver.make_int_view(EqualConst::new(x, 5)).unwrap();
        solver.close().unwrap();

        assert_eq!((solver.lower_bound(outside), solver.upper_bound(outside)), (1, 1));
        check_exhaustively(
            &mut solver,
            &[x],
            &[inside, outside],
            |values: &[i64]| vec![i64::from(values[0] != 1), 1],
            true,
        );
    }
}
