use crate::basic_types::EngineError;
use crate::containers::StorageKey;
use crate::propagation::BoundsContext;
use crate::propagation::InputCursor;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::LocalId;
use crate::propagation::ReadValues;
use crate::propagation::RegistrationContext;
use crate::propagation::VarViewId;

const CONDITION: usize = 0;
const THEN: usize = 1;
const ELSE: usize = 2;

/// Defines `output = if condition == 0 { then } else { otherwise }`.
///
/// Both branches are dynamic inputs; only the selected branch is active.
#[derive(Clone, Debug)]
pub struct IfThenElse {
    output: VarViewId,
    condition: VarViewId,
    branches: [VarViewId; 2],
    cursor: InputCursor,
}

impl IfThenElse {
    pub fn new(
        output: VarViewId,
        condition: VarViewId,
        then: VarViewId,
        otherwise: VarViewId,
    ) -> Self {
        IfThenElse {
            output,
            condition,
            branches: [then, otherwise],
            cursor: InputCursor::default(),
        }
    }

    /// The local id of the selected branch.
    fn selected(&self, context: &InvariantContext<'_>) -> usize {
        if context.value(self.condition) == 0 {
            THEN
        } else {
            ELSE
        }
    }

    fn branch(&self, local_index: usize) -> VarViewId {
        self.branches[local_index - THEN]
    }

    fn select(&self, context: &mut InvariantContext<'_>) {
        let selected = self.selected(context);
        let other = if selected == THEN { ELSE } else { THEN };

        context.make_dynamic_input_inactive(LocalId::create_from_index(other));
        context.make_dynamic_input_active(LocalId::create_from_index(selected));

        let value = context.value(self.branch(selected));
        context.update_value(self.output, value);
    }
}

impl Invariant for IfThenElse {
    fn name(&self) -> &str {
        "IfThenElse"
    }

    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError> {
        let _ = context.register_static_input(self.condition)?;
        for &branch in self.branches.iter() {
            let _ = context.register_dynamic_input(branch)?;
        }
        let _ = context.register_defined_var(self.output)?;
        Ok(())
    }

    fn update_bounds(&mut self, mut context: BoundsContext<'_>) -> Result<(), EngineError> {
        let condition_lower_bound = context.lower_bound(self.condition);
        let condition_upper_bound = context.upper_bound(self.condition);

        let mut candidates = vec![];
        if condition_lower_bound <= 0 && 0 <= condition_upper_bound {
            candidates.push(self.branches[0]);
        }
        if condition_lower_bound != 0 || condition_upper_bound != 0 {
            candidates.push(self.branches[1]);
        }

        let lower_bound = candidates
            .iter()
            .map(|&branch| context.lower_bound(branch))
            .min()
            .unwrap_or(0);
        let upper_bound = candidates
            .iter()
            .map(|&branch| context.upper_bound(branch))
            .max()
            .unwrap_or(0);

        context.set_bounds(self.output, lower_bound, upper_bound)
    }

    fn recompute(&mut self, mut context: InvariantContext<'_>) {
        self.select(&mut context);
    }

    fn notify_input_changed(&mut self, mut context: InvariantContext<'_>, local_id: LocalId) {
        let local_index = local_id.index();
        if local_index == CONDITION {
            self.select(&mut context);
        } else if local_index == self.selected(&context) {
            let value = context.value(self.branch(local_index));
            context.update_value(self.output, value);
        }
    }

    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId> {
        match self.cursor.advance(context.timestamp()) {
            0 => Some(self.condition),
            1 => Some(self.branch(self.selected(&context))),
            _ => None,
        }
    }

    fn notify_current_input_changed(&mut self, mut context: InvariantContext<'_>) {
        match self.cursor.position(context.timestamp()) {
            Some(0) => self.select(&mut context),
            Some(1) => {
                let value = context.value(self.branch(self.selected(&context)));
                context.update_value(self.output, value);
            }
            _ => {}
        }
    }
}
