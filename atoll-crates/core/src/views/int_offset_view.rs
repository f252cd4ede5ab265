use crate::propagation::IntView;
use crate::propagation::VarViewId;

/// `parent + offset`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntOffsetView {
    parent: VarViewId,
    offset: i64,
}

impl IntOffsetView {
    pub fn new(parent: VarViewId, offset: i64) -> Self {
        IntOffsetView { parent, offset }
    }
}

impl IntView for IntOffsetView {
    fn name(&self) -> &str {
        "IntOffsetView"
    }

    fn parent(&self) -> VarViewId {
        self.parent
    }

    fn compute(&self, parent_value: i64) -> i64 {
        parent_value + self.offset
    }
}
