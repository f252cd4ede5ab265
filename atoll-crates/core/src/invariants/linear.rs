use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::StorageKey;
use crate::propagation::BoundsContext;
use crate::propagation::CommittableInt;
use crate::propagation::InputCursor;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::LocalId;
use crate::propagation::ReadValues;
use crate::propagation::RegistrationContext;
use crate::propagation::VarViewId;

/// Defines `output = Σ coefficients[i] * inputs[i]`.
///
/// A changed input updates the sum by the difference with the input value the invariant saw
/// last, which is kept per input. The bounds of the sum must fit into an `i64`; values are added
/// with wrapping arithmetic, so an incremental update always agrees with a recomputation.
#[derive(Clone, Debug)]
pub struct Linear {
    output: VarViewId,
    coefficients: Vec<i64>,
    inputs: Vec<VarViewId>,
    previous_values: Vec<CommittableInt>,
    cursor: InputCursor,
}

impl Linear {
    pub fn new(output: VarViewId, coefficients: Vec<i64>, inputs: Vec<VarViewId>) -> Self {
        let previous_values = vec![CommittableInt::new(Timestamp::NULL, 0); inputs.len()];
        Linear {
            output,
            coefficients,
            inputs,
            previous_values,
            cursor: InputCursor::default(),
        }
    }

    fn update_input(&mut self, mut context: InvariantContext<'_>, index: usize) {
        let timestamp = context.timestamp();
        let new_value = context.value(self.inputs[index]);
        let previous_value = self.previous_values[index].value(timestamp);
        if new_value == previous_value {
            return;
        }

        self.previous_values[index].set_value(timestamp, new_value);
        let delta = self.coefficients[index].wrapping_mul(new_value.wrapping_sub(previous_value));
        let sum = context.value(self.output).wrapping_add(delta);
        context.update_value(self.output, sum);
    }
}

impl Invariant for Linear {
    fn name(&self) -> &str {
        "Linear"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        if self.coefficients.len() != self.inputs.len() {
            return Err(EngineError::InvalidArguments {
                name: "Linear",
                reason: "every input needs exactly one coefficient",
            });
        }

        for &input in self.inputs.iter() {
            let _ = context.register_static_input(input)?;
        }
        let _ = context.register_defined_var(self.output)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let overflow = EngineError::Overflow {
            what: "The bounds of a linear sum",
        };

        let mut lower_bound: i64 = 0;
        let mut upper_bound: i64 = 0;
        for (&input, &coefficient) in self.inputs.iter().zip(self.coefficients.iter()) {
            let at_lower = coefficient.checked_mul(context.lower_bound(input));
            let at_upper = coefficient.checked_mul(context.upper_bound(input));
            let (Some(at_lower), Some(at_upper)) = (at_lower, at_upper) else {
                return Err(overflow);
            };

            lower_bound = lower_bound
                .checked_add(at_lower.min(at_upper))
                .ok_or_else(|| overflow.clone())?;
            upper_bound = upper_bound
                .checked_add(at_lower.max(at_upper))
                .ok_or_else(|| overflow.clone())?;
        }

        context.set_bounds(self.output, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let timestamp = context.timestamp();
        let mut sum = 0;
        for (index, &input) in self.inputs.iter().enumerate() {
            let value = context.value(input);
            self.previous_values[index].set_value(timestamp, value);
            sum = self.coefficients[index].wrapping_mul(value).wrapping_add(sum);
        }

        context.update_value(self.output, sum);
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
        self.previous_values
            .iter_mut()
            .for_each(|value| value.commit_if(timestamp));
    }
}
