use super::VarViewId;
use crate::basic_types::EngineError;

/// A view is a pure function of a single parent variable or view.
///
/// Views hold no value of their own; the engine derives a view's current value, committed value
/// and bounds from its parent on every read. Views are never scheduled, notified or committed.
pub trait IntView {
    /// The name of the view, used for logging.
    fn name(&self) -> &str;

    /// The variable or view this view is a function of.
    fn parent(&self) -> VarViewId;

    /// Checks the arguments of the view when it is added to a solver.
    fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// The value of the view given the value of its parent.
    fn compute(&self, parent_value: i64) -> i64;

    /// The bounds of the view given the bounds of its parent, as `(lower_bound, upper_bound)`.
    ///
    /// The default implementation is only correct for monotone views.
    fn compute_bounds(&self, parent_lower_bound: i64, parent_upper_bound: i64) -> (i64, i64) {
        let at_lower = self.compute(parent_lower_bound);
        let at_upper = self.compute(parent_upper_bound);
        (at_lower.min(at_upper), at_lower.max(at_upper))
    }
}
