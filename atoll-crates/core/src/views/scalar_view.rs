use crate::propagation::IntView;
use crate::propagation::VarViewId;

/// `scalar * parent`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalarView {
    parent: VarViewId,
    scalar: i64,
}

impl ScalarView {
    pub fn new(parent: VarViewId, scalar: i64) -> Self {
        ScalarView { parent, scalar }
    }
}

impl IntView for ScalarView {
    fn name(&self) -> &str {
        "ScalarView"
    }

    fn parent(&self) -> VarViewId {
        self.parent
    }

    fn compute(&self, parent_value: i64) -> i64 {
        self.scalar * parent_value
    }
}
