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

/// Defines `output` as the number of `inputs` whose value equals the value of `needle`.
///
/// The invariant maintains the number of occurrences of every value in the union of the input
/// domains. The inputs have local ids `0..n` and the needle has local id `n`.
#[derive(Clone, Debug)]
pub struct Count {
    output: VarViewId,
    needle: VarViewId,
    inputs: Vec<VarViewId>,
    local_values: Vec<CommittableInt>,
    counts: OccurrenceCounts,
    cursor: InputCursor,
}

impl Count {
    pub fn new(output: VarViewId, needle: VarViewId, inputs: Vec<VarViewId>) -> Self {
        let local_values = vec![CommittableInt::new(Timestamp::NULL, 0); inputs.len()];
        Count {
            output,
            needle,
            inputs,
            local_values,
            counts: OccurrenceCounts::default(),
            cursor: InputCursor::default(),
        }
    }

    fn update_output(&self, context: &mut InvariantContext<'_>) {
        let needle = context.value(self.needle);
        let occurrences = self.counts.get(context.timestamp(), needle);
        context.update_value(self.output, occurrences);
    }

    fn update_input(&mut self, mut context: InvariantContext<'_>, index: usize) {
        let timestamp = context.timestamp();
        let new_value = context.value(self.inputs[index]);
        let old_value = self.local_values[index].value(timestamp);

        if new_value != old_value {
            self.local_values[index].set_value(timestamp, new_value);
            let _ = self.counts.add(timestamp, old_value, -1);
            let _ = self.counts.add(timestamp, new_value, 1);
        }

        self.update_output(&mut context);
    }

    fn update(&mut self, mut context: InvariantContext<'_>, index: usize) {
        if index == self.inputs.len() {
            self.update_output(&mut context);
        } else {
            self.update_input(context, index);
        }
    }
}

impl Invariant for Count {
    fn name(&self) -> &str {
        "Count"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        for &input in self.inputs.iter() {
            let _ = context.register_static_input(input)?;
        }
        let _ = context.register_static_input(self.needle)?;
        let _ = context.register_defined_var(self.output)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        context.set_bounds(self.output, 0, self.inputs.len() as i64)
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

        for index in 0..self.inputs.len() {
            let value = context.value(self.inputs[index]);
            self.local_values[index].set_value(timestamp, value);
            let _ = self.counts.add(timestamp, value, 1);
        }

        self.update_output(&mut context);
    }

    fn notify_input_changed(&mut self, context: InvariantContext<'_>, local_id: LocalId) {
        self.update(context, local_id.index());
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        let position = self.cursor.advance(context.timestamp());
        match position.cmp(&self.inputs.len()) {
            std::cmp::Ordering::Less => Some(self.inputs[position]),
            std::cmp::Ordering::Equal => Some(self.needle),
            std::cmp::Ordering::Greater => None,
        }
    }

    fn notify_current_input_changed(&mut self, context: InvariantContext<'_>) {
        if let Some(position) = self.cursor.position(context.timestamp()) {
            self.update(context, position);
        }
    }

    fn commit(&mut self, timestamp: Timestamp) {
        self.local_values
            .iter_mut()
            .for_each(|value| value.commit_if(timestamp));
        self.counts.commit_if(timestamp);
    }
}
