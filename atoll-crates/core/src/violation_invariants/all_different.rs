use crate::atoll_asserts::atoll_assert_simple;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::StorageKey;
use crate::propagation::BoundsContext;
use crate::propagation::CommittableInt;
use crate::propagation::InputCursor;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::LocalId;
use crate::propagation::OccurrenceCounts;
use crate::propagation::ReadValues;
use crate::propagation::RegistrationContext;
use crate::propagation::VarViewId;
use crate::propagation::ViolationInvariant;

/// The violation of `all_different(inputs)`: the number of inputs which would have to change
/// for all values to be distinct, `Σ_v max(0, count(v) - 1)`.
#[derive(Clone, Debug)]
pub struct AllDifferent {
    violation: VarViewId,
    inputs: Vec<VarViewId>,
    local_values: Vec<CommittableInt>,
    /// The number of occurrences of every value, with a table for the union of the input
    /// domains.
    counts: OccurrenceCounts,
    cursor: InputCursor,
}

impl AllDifferent {
    pub fn new(violation: VarViewId, inputs: Vec<VarViewId>) -> Self {
        let local_values = vec![CommittableInt::new(Timestamp::NULL, 0); inputs.len()];
        AllDifferent {
            violation,
            inputs,
            local_values,
            counts: OccurrenceCounts::default(),
            cursor: InputCursor::default(),
        }
    }

    /// Adds `delta` occurrences of `value` and returns the resulting change of the violation.
    fn change_count(&mut self, timestamp: Timestamp, value: i64, delta: i64) -> i64 {
        let (old_count, new_count) = self.counts.add(timestamp, value, delta);
        atoll_assert_simple!(new_count >= 0, "negative count for value {value}");

        (new_count - 1).max(0) - (old_count - 1).max(0)
    }

    fn update_input(&mut self, mut context: InvariantContext<'_>, index: usize) {
        let timestamp = context.timestamp();
        let new_value = context.value(self.inputs[index]);
        let old_value = self.local_values[index].value(timestamp);
        if new_value == old_value {
            return;
        }

        self.local_values[index].set_value(timestamp, new_value);
        let delta = self.change_count(timestamp, old_value, -1)
            + self.change_count(timestamp, new_value, 1);
        if delta != 0 {
            context.inc_value(self.violation, delta);
        }
    }
}

impl Invariant for AllDifferent {
    fn name(&self) -> &str {
        "AllDifferent"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        for &input in self.inputs.iter() {
            let _ = context.register_static_input(input)?;
        }
        let _ = context.register_defined_var(self.violation)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let upper_bound = self.inputs.len().saturating_sub(1) as i64;
        context.set_bounds(self.violation, 0, upper_bound)
    }

    fn close(&mut self, context: InvariantContext<'_>) -> Result<(), EngineError> {
        let lower_bound = self
            .inputs
            .iter()
            .map(|&input| context.lower_bound(input))
            .min();
        let upper_bound = self
            .inputs
            .iter()
            .map(|&input| context.upper_bound(input))
            .max();

        if let (Some(lower_bound), Some(upper_bound)) = (lower_bound, upper_bound) {
            self.counts = OccurrenceCounts::for_range(context.timestamp(), lower_bound, upper_bound);
        }
        Ok(())
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let timestamp = context.timestamp();
        self.counts.reset(timestamp);

        let mut violation = 0;
        for index in 0..self.inputs.len() {
            let value = context.value(self.inputs[index]);
            self.local_values[index].set_value(timestamp, value);
            violation += self.change_count(timestamp, value, 1);
        }

        context.update_value(self.violation, violation);
    }

    fn notify_input_changed(&mut self, context: InvariantContext<'_>, local_id: LocalId) {
        self.update_input(context, local_id.index());
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        let position = self.cursor.advance(context.timestamp());
        self.inputs.get(position).copied()
    }

    fn notify_current_input_changed(&mut self, context: InvariantContext<'_>) {
        if let Some(position) = self.cursor.position(context.timestamp()) {
            self.update_input(context, position);
        }
    }

    fn commit(&mut self, timestamp: Timestamp) {
        self.local_values
            .iter_mut()
            .for_each(|value| value.commit_if(timestamp));
        self.counts.commit_if(timestamp);
    }
}

impl ViolationInvariant for AllDifferent {
    fn violation_id(&self) -> VarViewId {
        self.violation
    }
}
