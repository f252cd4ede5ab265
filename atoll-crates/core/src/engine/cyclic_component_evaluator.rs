use super::EngineStatistics;
use super::PropagationGraph;
use super::Store;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::propagation::InvariantContext;
use crate::propagation::InvariantId;
use crate::propagation::LocalId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EvaluationState {
    /// The invariant is up to date, or not part of the current evaluation.
    Done,
    Pending,
    InProgress,
}

/// Evaluates the members of a cyclic component in the order given by their active inputs.
///
/// The static inputs of a component are acyclic, so every member first evaluates the members
/// defining its static inputs. After it recomputed, its active dynamic inputs are known; the
/// members defining those are evaluated next, after which the member recomputes once more. A
/// member which is reached again while it is still being evaluated closes a cycle of active
/// inputs.
#[derive(Debug, Default)]
pub(crate) struct CyclicComponentEvaluator {
    state: KeyedVec<InvariantId, EvaluationState>,
    /// The members being evaluated, outermost first.
    path: Vec<InvariantId>,
}

/// The state the evaluator needs from the solver.
pub(crate) struct EvaluationContext<'a> {
    pub(crate) timestamp: Timestamp,
    pub(crate) store: &'a mut Store,
    pub(crate) graph: &'a mut PropagationGraph,
    pub(crate) statistics: &'a mut EngineStatistics,
}

impl CyclicComponentEvaluator {
    pub(crate) fn new(num_invariants: usize) -> Self {
        CyclicComponentEvaluator {
            state: KeyedVec::filled(num_invariants, EvaluationState::Done),
            path: vec![],
        }
    }

    /// Recomputes `members`, which all belong to the same cyclic component and include every
    /// member that reads one of them.
    pub(crate) fn evaluate(
        &mut self,
        members: &[InvariantId],
        context: &mut EvaluationContext<'_>,
    ) -> Result<(), EngineError> {
        for &invariant_id in members {
            self.state[invariant_id] = EvaluationState::Pending;
        }

        let result = members
            .iter()
            .try_for_each(|&invariant_id| self.settle(invariant_id, context));

        if result.is_err() {
            for &invariant_id in members {
                self.state[invariant_id] = EvaluationState::Done;
            }
            self.path.clear();
        }
        result
    }

    fn settle(
        &mut self,
        invariant_id: InvariantId,
        context: &mut EvaluationContext<'_>,
    ) -> Result<(), EngineError> {
        match self.state[invariant_id] {
            EvaluationState::Done => return Ok(()),
            EvaluationState::InProgress => {
                let start = self
                    .path
                    .iter()
                    .position(|&member| member == invariant_id)
                    .unwrap_or(0);
                return Err(EngineError::DynamicCycle {
                    invariants: self.path[start..].to_vec(),
                });
            }
            EvaluationState::Pending => {}
        }

        self.state[invariant_id] = EvaluationState::InProgress;
        self.path.push(invariant_id);

        for definer in self.input_definers(invariant_id, context, false) {
            self.settle(definer, context)?;
        }
        Self::recompute(invariant_id, context);

        let dynamic_definers = self.input_definers(invariant_id, context, true);
        if !dynamic_definers.is_empty() {
            for definer in dynamic_definers {
                self.settle(definer, context)?;
            }
            Self::recompute(invariant_id, context);
        }

        let _ = self.path.pop();
        self.state[invariant_id] = EvaluationState::Done;
        Ok(())
    }

    /// The invariants still to be evaluated which define the static or the active dynamic
    /// inputs of the invariant.
    fn input_definers(
        &self,
        invariant_id: InvariantId,
        context: &EvaluationContext<'_>,
        dynamic: bool,
    ) -> Vec<InvariantId> {
        context
            .graph
            .incoming_arcs(invariant_id)
            .iter()
            .enumerate()
            .filter(|(index, arc)| {
                arc.dynamic_index.is_some() == dynamic
                    && context.graph.is_input_active(
                        context.timestamp,
                        invariant_id,
                        LocalId::create_from_index(*index),
                    )
            })
            .filter_map(|(_, arc)| context.graph.defining_invariant(arc.source))
            .filter(|&definer| self.state[definer] != EvaluationState::Done)
            .collect()
    }

    fn recompute(invariant_id: InvariantId, context: &mut EvaluationContext<'_>) {
        context.statistics.num_recomputations += 1;
        context.store.invariants[invariant_id].recompute(InvariantContext::new(
            context.timestamp,
            invariant_id,
            &mut context.store.variables,
            context.graph,
        ));
    }
}

