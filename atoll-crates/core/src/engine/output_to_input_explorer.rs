use super::EngineStatistics;
use super::OutputToInputMarkingMode;
use super::PropagationGraph;
use super::Store;
use crate::atoll_asserts::atoll_assert_simple;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::propagation::InvariantContext;
use crate::propagation::InvariantId;
use crate::propagation::VarId;

/// Demand-driven propagation.
///
/// Starting from the registered variables, the explorer walks backward through the defining
/// invariants. An invariant on the stack is asked for its relevant inputs one at a time through
/// [`Invariant::next_input`](crate::propagation::Invariant::next_input); once an input is
/// computed, the invariant is notified if the input changed. A variable counts as computed for
/// the rest of the timestamp once its defining invariant has run through all of its inputs.
///
/// Reaching a variable whose defining invariant is still on the stack means the active inputs
/// form a cycle, which aborts the propagation.
#[derive(Debug, Default)]
pub(crate) struct OutputToInputExplorer {
    var_stack: Vec<VarId>,
    invariant_stack: Vec<InvariantId>,
    var_computed_at: KeyedVec<VarId, Timestamp>,
    invariant_on_stack: KeyedVec<InvariantId, bool>,
    registered_vars: Vec<VarId>,

    marking_mode: OutputToInputMarkingMode,
    /// For [`OutputToInputMarkingMode::OutputToInputStatic`]: the search variables from which
    /// every variable is reachable.
    search_var_ancestors: KeyedVec<VarId, HashSet<VarId>>,
    /// For [`OutputToInputMarkingMode::InputToOutputExploration`]: the variables reachable from
    /// the modified search variables.
    on_propagation_path: KeyedVec<VarId, bool>,
}

/// The state the explorer needs from the solver during one propagation.
pub(crate) struct ExplorationContext<'a> {
    pub(crate) timestamp: Timestamp,
    pub(crate) store: &'a mut Store,
    pub(crate) graph: &'a mut PropagationGraph,
    pub(crate) modified_search_vars: &'a HashSet<VarId>,
    pub(crate) statistics: &'a mut EngineStatistics,
}

impl OutputToInputExplorer {
    pub(crate) fn new(graph: &PropagationGraph, marking_mode: OutputToInputMarkingMode) -> Self {
        let num_vars = graph.num_vars();
        let mut explorer = OutputToInputExplorer {
            var_stack: Vec::with_capacity(num_vars),
            invariant_stack: Vec::with_capacity(graph.num_invariants()),
            var_computed_at: KeyedVec::filled(num_vars, Timestamp::NULL),
            invariant_on_stack: KeyedVec::filled(graph.num_invariants(), false),
            registered_vars: vec![],
            marking_mode,
            search_var_ancestors: KeyedVec::default(),
            on_propagation_path: KeyedVec::default(),
        };

        match marking_mode {
            OutputToInputMarkingMode::None => {}
            OutputToInputMarkingMode::OutputToInputStatic => {
                explorer.compute_search_var_ancestors(graph)
            }
            OutputToInputMarkingMode::InputToOutputExploration => {
                explorer.on_propagation_path = KeyedVec::filled(num_vars, false)
            }
        }

        explorer
    }

    pub(crate) fn clear_registered_vars(&mut self) {
        self.registered_vars.clear();
    }

    pub(crate) fn register_for_propagation(&mut self, var: VarId) {
        self.registered_vars.push(var);
    }

    /// Makes every registered variable correct at the timestamp of the context.
    pub(crate) fn propagate(&mut self, mut context: ExplorationContext<'_>) -> Result<(), EngineError> {
        let result = self.explore(&mut context);
        if result.is_err() {
            self.abort(&context);
        }
        result
    }

    fn explore(&mut self, context: &mut ExplorationContext<'_>) -> Result<(), EngineError> {
        if self.marking_mode == OutputToInputMarkingMode::InputToOutputExploration {
            self.mark_propagation_path(context.graph, context.modified_search_vars);
        }

        let timestamp = context.timestamp;
        for index in 0..self.registered_vars.len() {
            let var = self.registered_vars[index];
            if self.is_marked(var, context.modified_search_vars) {
                self.var_stack.push(var);
            } else {
                self.var_computed_at[var] = timestamp;
            }
        }

        while let Some(&var) = self.var_stack.last() {
            let definer = context.graph.defining_invariant(var);
            if self.var_computed_at[var] != timestamp {
                // The variable is computed once its defining invariant (if any) is done.
                self.var_computed_at[var] = timestamp;
                if let Some(invariant_id) = definer {
                    self.expand_invariant(invariant_id, context)?;
                    continue;
                }
            } else if let Some(invariant_id) = definer {
                self.ensure_not_on_stack(invariant_id)?;
            }

            let _ = self.var_stack.pop();
            let Some(&invariant_id) = self.invariant_stack.last() else {
                continue;
            };

            if context.store.variables.int_var(var).has_changed(timestamp) {
                context.statistics.num_notifications += 1;
                context.store.invariants[invariant_id].notify_current_input_changed(
                    InvariantContext::new(
                        timestamp,
                        invariant_id,
                        &mut context.store.variables,
                        context.graph,
                    ),
                );
            }

            if self.push_next_input_var(invariant_id, context) {
                self.pop_invariant();
            }
        }

        atoll_assert_simple!(self.invariant_stack.is_empty());
        Ok(())
    }

    fn expand_invariant(
        &mut self,
        invariant_id: InvariantId,
        context: &mut ExplorationContext<'_>,
    ) -> Result<(), EngineError> {
        self.ensure_not_on_stack(invariant_id)?;

        self.invariant_stack.push(invariant_id);
        self.invariant_on_stack[invariant_id] = true;

        if self.push_next_input_var(invariant_id, context) {
            self.pop_invariant();
        }
        Ok(())
    }

    fn ensure_not_on_stack(&self, invariant_id: InvariantId) -> Result<(), EngineError> {
        if !self.invariant_on_stack[invariant_id] {
            return Ok(());
        }

        let start = self
            .invariant_stack
            .iter()
            .position(|&on_stack| on_stack == invariant_id)
            .unwrap_or(0);
        Err(EngineError::DynamicCycle {
            invariants: self.invariant_stack[start..].to_vec(),
        })
    }

    /// Empties the stacks after a failed propagation. The variables defined by the unfinished
    /// invariants are no longer considered computed.
    fn abort(&mut self, context: &ExplorationContext<'_>) {
        while let Some(invariant_id) = self.invariant_stack.pop() {
            self.invariant_on_stack[invariant_id] = false;
            for &var in context.graph.defined_vars(invariant_id) {
                self.var_computed_at[var] = Timestamp::NULL;
            }
        }
        self.var_stack.clear();
    }

    /// Pushes the next relevant input of the invariant onto the variable stack. Returns `true`
    /// when the invariant has no more inputs.
    fn push_next_input_var(
        &mut self,
        invariant_id: InvariantId,
        context: &mut ExplorationContext<'_>,
    ) -> bool {
        loop {
            let next_input = context.store.invariants[invariant_id].next_input(
                InvariantContext::new(
                    context.timestamp,
                    invariant_id,
                    &mut context.store.variables,
                    context.graph,
                ),
            );

            let Some(input) = next_input else {
                return true;
            };

            let source = context.store.variables.source_id(input);
            if self.is_marked(source, context.modified_search_vars) {
                context.statistics.num_explored_inputs += 1;
                self.var_stack.push(source);
                return false;
            }
        }
    }

    fn pop_invariant(&mut self) {
        if let Some(invariant_id) = self.invariant_stack.pop() {
            self.invariant_on_stack[invariant_id] = false;
        }
    }

    /// Whether `var` can have changed given the modified search variables.
    fn is_marked(&self, var: VarId, modified_search_vars: &HashSet<VarId>) -> bool {
        match self.marking_mode {
            OutputToInputMarkingMode::None => true,
            OutputToInputMarkingMode::OutputToInputStatic => {
                let ancestors = &self.search_var_ancestors[var];
                if ancestors.len() < modified_search_vars.len() {
                    ancestors
                        .iter()
                        .any(|ancestor| modified_search_vars.contains(ancestor))
                } else {
                    modified_search_vars
                        .iter()
                        .any(|modified| ancestors.contains(modified))
                }
            }
            OutputToInputMarkingMode::InputToOutputExploration => self.on_propagation_path[var],
        }
    }

    fn compute_search_var_ancestors(&mut self, graph: &PropagationGraph) {
        self.search_var_ancestors = KeyedVec::filled(graph.num_vars(), HashSet::default());

        let mut stack = vec![];
        let mut visited: KeyedVec<VarId, bool> = KeyedVec::filled(graph.num_vars(), false);

        for &search_var in graph.search_vars() {
            visited.fill(false);
            stack.push(search_var);
            visited[search_var] = true;

            while let Some(var) = stack.pop() {
                let _ = self.search_var_ancestors[var].insert(search_var);

                for arc in graph.all_outgoing_arcs(var) {
                    for &defined_var in graph.defined_vars(arc.invariant_id) {
                        if !visited[defined_var] {
                            visited[defined_var] = true;
                            stack.push(defined_var);
                        }
                    }
                }
            }
        }
    }

    fn mark_propagation_path(
        &mut self,
        graph: &PropagationGraph,
        modified_search_vars: &HashSet<VarId>,
    ) {
        self.on_propagation_path.fill(false);

        let mut stack: Vec<VarId> = modified_search_vars.iter().copied().collect();
        for &var in stack.iter() {
            self.on_propagation_path[var] = true;
        }

        while let Some(var) = stack.pop() {
            for arc in graph.all_outgoing_arcs(var) {
                for &defined_var in graph.defined_vars(arc.invariant_id) {
                    if !self.on_propagation_path[defined_var] {
                        self.on_propagation_path[defined_var] = true;
                        stack.push(defined_var);
                    }
                }
            }
        }
    }
}
