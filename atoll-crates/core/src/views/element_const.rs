use itertools::Itertools;
use itertools::MinMaxResult;

use crate::basic_types::EngineError;
use crate::invariants::clamped_index;
use crate::propagation::IntView;
use crate::propagation::VarViewId;

/// `array[parent - offset]` for a constant array, where an index outside the array selects the
/// nearest element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementConst {
    parent: VarViewId,
    array: Vec<i64>,
    offset: i64,
}

impl ElementConst {
    pub fn new(parent: VarViewId, array: Vec<i64>, offset: i64) -> Self {
        ElementConst {
            parent,
            array,
            offset,
        }
    }
}

impl IntView for ElementConst {
    fn name(&self) -> &str {
        "ElementConst"
    }

    fn parent(&self) -> VarViewId {
        self.parent
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.array.is_empty() {
            return Err(EngineError::InvalidArguments {
                name: "ElementConst",
                reason: "the array is empty",
            });
        }
        Ok(())
    }

    fn compute(&self, parent_value: i64) -> i64 {
        self.array[clamped_index(parent_value, self.offset, self.array.len())]
    }

    fn compute_bounds(&self, parent_lower_bound: i64, parent_upper_bound: i64) -> (i64, i64) {
        let first = clamped_index(parent_lower_bound, self.offset, self.array.len());
        let last = clamped_index(parent_upper_bound, self.offset, self.array.len());

        match self.array[first..=last].iter().minmax() {
            MinMaxResult::OneElement(&value) => (value, value),
            MinMaxResult::MinMax(&lower_bound, &upper_bound) => (lower_bound, upper_bound),
            MinMaxResult::NoElements => unreachable!("the array of an element view is non-empty"),
        }
    }
}
