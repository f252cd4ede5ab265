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

/// The violation of `x <= y`, which is `max(0, x - y)`.
#[derive(Clone, Debug)]
pub struct LessEqual {
    violation: VarViewId,
    x: VarViewId,
    y: VarViewId,
    cursor: InputCursor,
}

impl LessEqual {
    pub fn new(violation: VarViewId, x: VarViewId, y: VarViewId) -> Self {
        LessEqual {
            violation,
            x,
            y,
            cursor: InputCursor::default(),
        }
    }
}

impl Invariant for LessEqual {
    fn name(&self) -> &str {
        "LessEqual"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        let _ = context.register_static_input(self.x)?;
        let _ = context.register_static_input(self.y)?;
        let _ = context.register_defined_var(self.violation)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let lower_bound = 0_i64.max(context.lower_bound(self.x) - context.upper_bound(self.y));
        let upper_bound = 0_i64.max(context.upper_bound(self.x) - context.lower_bound(self.y));
        context.set_bounds(self.violation, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let violation = 0_i64.max(context.value(self.x) - context.value(self.y));
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

impl ViolationInvariant for LessEqual {
    fn violation_id(&self) -> VarViewId {
        self.violation
    }
}
