use crate::basic_types::EngineError;
use crate::propagation::BoundsContext;
use crate::propagation::InputCursor;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::LocalId;
use crate::propagation::NotificationPolicy;
use crate::propagation::ReadValues;
use crate::propagation::RegistrationContext;
use crate::propagation::VarViewId;
use crate::propagation::ViolationInvariant;

/// The violation of `x == y`, which is `|x - y|`.
#[derive(Clone, Debug)]
pub struct Equal {
    violation: VarViewId,
    x: VarViewId,
    y: VarViewId,
    cursor: InputCursor,
}

impl Equal {
    pub fn new(violation: VarViewId, x: VarViewId, y: VarViewId) -> Self {
        Equal {
            violation,
            x,
            y,
            cursor: InputCursor::default(),
        }
    }
}

impl Invariant for Equal {
    fn name(&self) -> &str {
        "Equal"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        let _ = context.register_static_input(self.x)?;
        let _ = context.register_static_input(self.y)?;
        let _ = context.register_defined_var(self.violation)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let x_lower_bound = context.lower_bound(self.x);
        let x_upper_bound = context.upper_bound(self.x);
        let y_lower_bound = context.lower_bound(self.y);
        let y_upper_bound = context.upper_bound(self.y);

        // Zero if the domains overlap, the gap between them otherwise.
        let lower_bound = 0_i64
            .max(x_lower_bound - y_upper_bound)
            .max(y_lower_bound - x_upper_bound);
        let upper_bound = (x_upper_bound - y_lower_bound).max(y_upper_bound - x_lower_bound);

        context.set_bounds(self.violation, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let violation = (context.value(self.x) - context.value(self.y)).abs();
        context.update_value(self.violation, violation);
    }

    fn notify_input_changed(&mut self, context: InvariantContext<'_>, _local_id: LocalId) {
        self.recompute(context);
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        match self.cursor.advance(context.timestamp()) {
            0 => Some(self.x),
            1 => Some(self.y),
            _ => None,
        }
    }

    fn notify_current_input_changed(&mut self, context: InvariantContext<'_>) {
        self.recompute(context);
    }

    fn notification_policy(&self) -> NotificationPolicy {
        NotificationPolicy::RecomputeOnMultipleChanges
    }
}

impl ViolationInvariant for Equal {
    fn violation_id(&self) -> VarViewId {
        self.violation
    }
}
