use super::clamped_index;
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

/// Defines `output = array[index - offset]`, where an index outside the array selects the
/// nearest element.
///
/// The elements of the array are dynamic inputs (local ids `0..n`) of which only the selected
/// one is active; the index is a static input with local id `n`.
#[derive(Clone, Debug)]
pub struct ElementVar {
    output: VarViewId,
    index: VarViewId,
    array: Vec<VarViewId>,
    offset: i64,
    /// The position of the active element.
    active: CommittableInt,
    cursor: InputCursor,
}

impl ElementVar {
    pub fn new(output: VarViewId, index: VarViewId, array: Vec<VarViewId>, offset: i64) -> Self {
        ElementVar {
            output,
            index,
            array,
            offset,
            active: CommittableInt::new(Timestamp::NULL, 0),
            cursor: InputCursor::default(),
        }
    }

    fn selected(&self, context: &InvariantContext<'_>) -> usize {
        clamped_index(context.value(self.index), self.offset, self.array.len())
    }

    /// Activates the selected element and makes it the output.
    fn select(&mut self, context: &mut InvariantContext<'_>) {
        let timestamp = context.timestamp();
        let selected = self.selected(context);
        let active = self.active.value(timestamp) as usize;

        if selected != active {
            context.make_dynamic_input_inactive(LocalId::create_from_index(active));
            context.make_dynamic_input_active(LocalId::create_from_index(selected));
            self.active.set_value(timestamp, selected as i64);
        }

        let value = context.value(self.array[selected]);
        context.update_value(self.output, value);
    }

    fn update(&mut self, mut context: InvariantContext<'_>, local_index: usize) {
        let timestamp = context.timestamp();
        if local_index == self.array.len() {
            self.select(&mut context);
        } else if local_index == self.active.value(timestamp) as usize {
            let value = context.value(self.array[local_index]);
            context.update_value(self.output, value);
        }
    }
}

impl Invariant for ElementVar {
    fn name(&self) -> &str {
        "ElementVar"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        if self.array.is_empty() {
            return Err(EngineError::InvalidArguments {
                name: "ElementVar",
                reason: "the array is empty",
            });
        }

        for &element in self.array.iter() {
            let _ = context.register_dynamic_input(element)?;
        }
        let _ = context.register_static_input(self.index)?;
        let _ = context.register_defined_var(self.output)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let first = clamped_index(context.lower_bound(self.index), self.offset, self.array.len());
        let last = clamped_index(context.upper_bound(self.index), self.offset, self.array.len());

        let (lower_bound, upper_bound) = self.array[first..=last].iter().fold(
            (i64::MAX, i64::MIN),
            |(lower_bound, upper_bound), &element| {
                (
                    lower_bound.min(context.lower_bound(element)),
                    upper_bound.max(context.upper_bound(element)),
                )
            },
        );

        context.set_bounds(self.output, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        let timestamp = context.timestamp();
        let selected = self.selected(&context);

        context.make_all_dynamic_inputs_inactive();
        context.make_dynamic_input_active(LocalId::create_from_index(selected));
        self.active.set_value(timestamp, selected as i64);

        let value = context.value(self.array[selected]);
        context.update_value(self.output, value);
    }

    fn notify_input_changed(&mut self, context: InvariantContext<'_>, local_id: LocalId) {
        self.update(context, local_id.index());
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        match self.cursor.advance(context.timestamp()) {
            0 => Some(self.index),
            1 => Some(self.array[self.selected(&context)]),
            _ => None,
        }
    }

    fn notify_current_input_changed(&mut self, mut context: InvariantContext<'_>) {
        match self.cursor.position(context.timestamp()) {
            Some(0) => self.select(&mut context),
            Some(1) => {
                let selected = self.selected(&context);
                let value = context.value(self.array[selected]);
                context.update_value(self.output, value);
            }
            _ => {}
        }
    }

    fn commit(&mut self, timestamp: Timestamp) {
        self.active.commit_if(timestamp);
    }
}
