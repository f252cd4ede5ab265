//! The dependency graph between variables and invariants.
//!
//! Every variable has at most one defining invariant; variables without one are search
//! variables. An invariant reads its inputs through static arcs, which always notify it, or
//! dynamic arcs, which only notify it while active. When the graph is closed, every invariant is
//! assigned a layer such that it only reads variables defined in strictly lower layers, or by
//! members of its own cyclic component.
mod arcs;

use std::collections::VecDeque;

pub(crate) use arcs::*;
use log::debug;

use crate::atoll_asserts::atoll_assert_eq_simple;
use crate::atoll_asserts::atoll_assert_simple;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::propagation::InputRegistration;
use crate::propagation::InvariantId;
use crate::propagation::LocalId;
use crate::propagation::VarId;

#[derive(Debug, Default)]
pub(crate) struct PropagationGraph {
    defining_invariant: KeyedVec<VarId, Option<InvariantId>>,
    static_arcs: KeyedVec<VarId, Vec<OutgoingArc>>,
    dynamic_arcs: KeyedVec<VarId, OutgoingDynamicArcs>,
    /// The inputs of every invariant, indexed by [`LocalId`].
    inputs: KeyedVec<InvariantId, Vec<IncomingArc>>,
    defined_vars: KeyedVec<InvariantId, Vec<VarId>>,

    layers: KeyedVec<InvariantId, usize>,
    num_layers: usize,
    /// All invariants, in non-decreasing layer order.
    topological_order: Vec<InvariantId>,
    cyclic_component: KeyedVec<InvariantId, Option<usize>>,
    cyclic_components: Vec<Vec<InvariantId>>,
    search_vars: Vec<VarId>,
    evaluation_vars: Vec<VarId>,
    is_closed: bool,

    /// Variables whose dynamic arcs changed at `touched_timestamp`.
    touched_dynamic_vars: Vec<VarId>,
    touched_at: KeyedVec<VarId, Timestamp>,
    touched_timestamp: Timestamp,
}

/// The result of ordering the invariants of a graph by their dependencies.
#[derive(Debug)]
pub(crate) struct Layering {
    pub(crate) layers: KeyedVec<InvariantId, usize>,
    pub(crate) topological_order: Vec<InvariantId>,
    pub(crate) num_layers: usize,
    /// The index of the cyclic component of every invariant, if it is part of one.
    pub(crate) cyclic_component: KeyedVec<InvariantId, Option<usize>>,
    /// Sets of invariants which depend on each other through dynamic inputs, every set in static
    /// topological order.
    pub(crate) cyclic_components: Vec<Vec<InvariantId>>,
}

impl Layering {
    /// The members of the cyclic component of the invariant, if it is part of one.
    pub(crate) fn cyclic_component_of(&self, invariant_id: InvariantId) -> Option<&[InvariantId]> {
        self.cyclic_component[invariant_id]
            .map(|component| self.cyclic_components[component].as_slice())
    }
}

impl PropagationGraph {
    pub(crate) fn register_var(&mut self, var: VarId) {
        atoll_assert_eq_simple!(var.index(), self.defining_invariant.len());

        let _ = self.defining_invariant.push(None);
        let _ = self.static_arcs.push(vec![]);
        let _ = self.dynamic_arcs.push(OutgoingDynamicArcs::default());
        let _ = self.touched_at.push(Timestamp::NULL);
    }

    /// Checks that an invariant with the given registration can be added to the graph.
    pub(crate) fn validate_invariant(
        &self,
        invariant_id: InvariantId,
        inputs: &[InputRegistration],
        defined_vars: &[VarId],
    ) -> Result<(), EngineError> {
        if self.is_closed {
            return Err(EngineError::SolverClosed);
        }

        for (index, &var) in defined_vars.iter().enumerate() {
            if let Some(defined_by) = self.defining_invariant[var] {
                return Err(EngineError::VarAlreadyDefined { var, defined_by });
            }
            if defined_vars[..index].contains(&var) {
                return Err(EngineError::VarAlreadyDefined {
                    var,
                    defined_by: invariant_id,
                });
            }
        }

        if let Some(input) = inputs
            .iter()
            .find(|input| defined_vars.contains(&input.source))
        {
            return Err(EngineError::SelfDependency {
                invariant: invariant_id,
                var: input.source,
            });
        }

        Ok(())
    }

    /// Adds an invariant whose registration passed [`PropagationGraph::validate_invariant`].
    pub(crate) fn add_invariant(
        &mut self,
        invariant_id: InvariantId,
        inputs: &[InputRegistration],
        defined_vars: Vec<VarId>,
    ) {
        atoll_assert_eq_simple!(invariant_id.index(), self.inputs.len());

        let incoming = inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let arc = OutgoingArc {
                    invariant_id,
                    local_id: LocalId::create_from_index(index),
                };
                let dynamic_index = if input.is_dynamic {
                    Some(self.dynamic_arcs[input.source].push(arc))
                } else {
                    self.static_arcs[input.source].push(arc);
                    None
                };

                IncomingArc {
                    id: input.id,
                    source: input.source,
                    dynamic_index,
                }
            })
            .collect();

        for &var in defined_vars.iter() {
            self.defining_invariant[var] = Some(invariant_id);
        }

        let _ = self.inputs.push(incoming);
        let _ = self.defined_vars.push(defined_vars);
        let _ = self.layers.push(0);
    }

    /// Orders the invariants by their dependencies.
    ///
    /// Only the static inputs have to be acyclic. Invariants which depend on each other through
    /// dynamic inputs form a cyclic component: they share a layer and are ordered at propagation
    /// time by which of their inputs are active. The layer of any other invariant is one more
    /// than the highest layer among the invariants which define its inputs, where search
    /// variables count as layer zero.
    pub(crate) fn compute_layering(&self) -> Result<Layering, EngineError> {
        let static_order = self.static_topological_order()?;
        let (component_of, num_components) = self.strongly_connected_components();

        // Tarjan's algorithm numbers the components in reverse topological order.
        let mut members: Vec<Vec<InvariantId>> = vec![vec![]; num_components];
        for &invariant_id in static_order.iter() {
            members[num_components - 1 - component_of[invariant_id]].push(invariant_id);
        }

        let num_invariants = self.inputs.len();
        let mut layers: KeyedVec<InvariantId, usize> = KeyedVec::filled(num_invariants, 0);
        let mut cyclic_component: KeyedVec<InvariantId, Option<usize>> =
            KeyedVec::filled(num_invariants, None);
        let mut cyclic_components = vec![];

        for component in members {
            let layer = 1 + component
                .iter()
                .flat_map(|&invariant_id| self.inputs[invariant_id].iter())
                .filter_map(|input| self.defining_invariant[input.source])
                .filter(|definer| !component.contains(definer))
                .map(|definer| layers[definer])
                .max()
                .unwrap_or(0);
            for &invariant_id in component.iter() {
                layers[invariant_id] = layer;
            }

            if component.len() > 1 {
                debug!("Invariants {component:?} form a cycle through dynamic inputs");
                for &invariant_id in component.iter() {
                    cyclic_component[invariant_id] = Some(cyclic_components.len());
                }
                cyclic_components.push(component);
            }
        }

        let mut topological_order = static_order;
        topological_order.sort_by_key(|&invariant_id| layers[invariant_id]);
        let num_layers = 1 + layers.iter().copied().max().unwrap_or(0);

        Ok(Layering {
            layers,
            topological_order,
            num_layers,
            cyclic_component,
            cyclic_components,
        })
    }

    /// A topological order of the invariants over their static inputs.
    fn static_topological_order(&self) -> Result<Vec<InvariantId>, EngineError> {
        let num_invariants = self.inputs.len();

        let mut in_degree: KeyedVec<InvariantId, usize> = KeyedVec::filled(num_invariants, 0);
        for (invariant_id, inputs) in self.inputs.entries() {
            in_degree[invariant_id] = inputs
                .iter()
                .filter(|input| {
                    input.dynamic_index.is_none()
                        && self.defining_invariant[input.source].is_some()
                })
                .count();
        }

        let mut ready: VecDeque<InvariantId> = in_degree
            .entries()
            .filter(|(_, degree)| **degree == 0)
            .map(|(invariant_id, _)| invariant_id)
            .collect();
        let mut order = Vec::with_capacity(num_invariants);

        while let Some(invariant_id) = ready.pop_front() {
            order.push(invariant_id);

            for &var in self.defined_vars[invariant_id].iter() {
                for arc in self.static_arcs[var].iter() {
                    in_degree[arc.invariant_id] -= 1;
                    if in_degree[arc.invariant_id] == 0 {
                        ready.push_back(arc.invariant_id);
                    }
                }
            }
        }

        if order.len() < num_invariants {
            let invariants = in_degree
                .entries()
                .filter(|(_, degree)| **degree > 0)
                .map(|(invariant_id, _)| invariant_id)
                .collect();
            return Err(EngineError::CyclicDependency { invariants });
        }

        Ok(order)
    }

    /// Tarjan's algorithm over the invariants, where an invariant points to every invariant
    /// which reads one of its defined variables through any arc.
    ///
    /// Returns the component of every invariant and the number of components.
    fn strongly_connected_components(&self) -> (KeyedVec<InvariantId, usize>, usize) {
        let num_invariants = self.inputs.len();
        let mut successors: KeyedVec<InvariantId, Vec<InvariantId>> = KeyedVec::default();
        for defined_vars in self.defined_vars.iter() {
            let _ = successors.push(
                defined_vars
                    .iter()
                    .flat_map(|&var| self.all_outgoing_arcs(var))
                    .map(|arc| arc.invariant_id)
                    .collect(),
            );
        }

        let mut visit_index: KeyedVec<InvariantId, Option<usize>> =
            KeyedVec::filled(num_invariants, None);
        let mut low_link: KeyedVec<InvariantId, usize> = KeyedVec::filled(num_invariants, 0);
        let mut on_stack: KeyedVec<InvariantId, bool> = KeyedVec::filled(num_invariants, false);
        let mut component_of: KeyedVec<InvariantId, usize> = KeyedVec::filled(num_invariants, 0);
        let mut stack = vec![];
        let mut num_visited = 0;
        let mut num_components = 0;

        for root in successors.keys() {
            if visit_index[root].is_some() {
                continue;
            }

            // Every frame holds an invariant and the position of its next successor.
            let mut frames = vec![(root, 0)];
            visit_index[root] = Some(num_visited);
            low_link[root] = num_visited;
            num_visited += 1;
            stack.push(root);
            on_stack[root] = true;

            while let Some(frame) = frames.last_mut() {
                let invariant_id = frame.0;

                if let Some(&successor) = successors[invariant_id].get(frame.1) {
                    frame.1 += 1;
                    match visit_index[successor] {
                        None => {
                            visit_index[successor] = Some(num_visited);
                            low_link[successor] = num_visited;
                            num_visited += 1;
                            stack.push(successor);
                            on_stack[successor] = true;
                            frames.push((successor, 0));
                        }
                        Some(index) if on_stack[successor] => {
                            low_link[invariant_id] = low_link[invariant_id].min(index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                let _ = frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    low_link[parent] = low_link[parent].min(low_link[invariant_id]);
                }

                if visit_index[invariant_id] == Some(low_link[invariant_id]) {
                    while let Some(member) = stack.pop() {
                        on_stack[member] = false;
                        component_of[member] = num_components;
                        if member == invariant_id {
                            break;
                        }
                    }
                    num_components += 1;
                }
            }
        }

        (component_of, num_components)
    }

    /// Freezes the graph with the given layering and derives the search and evaluation
    /// variables.
    pub(crate) fn close(&mut self, layering: Layering) {
        self.layers = layering.layers;
        self.topological_order = layering.topological_order;
        self.num_layers = layering.num_layers;
        self.cyclic_component = layering.cyclic_component;
        self.cyclic_components = layering.cyclic_components;

        self.search_vars = self
            .defining_invariant
            .entries()
            .filter(|(_, definer)| definer.is_none())
            .map(|(var, _)| var)
            .collect();
        self.evaluation_vars = self
            .static_arcs
            .keys()
            .filter(|&var| self.static_arcs[var].is_empty() && self.dynamic_arcs[var].len() == 0)
            .collect();

        self.is_closed = true;
    }

    /// Undoes [`PropagationGraph::close`] when the model could not be evaluated.
    pub(crate) fn reopen(&mut self) {
        self.is_closed = false;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub(crate) fn num_vars(&self) -> usize {
        self.defining_invariant.len()
    }

    pub(crate) fn num_invariants(&self) -> usize {
        self.inputs.len()
    }

    pub(crate) fn defining_invariant(&self, var: VarId) -> Option<InvariantId> {
        self.defining_invariant[var]
    }

    pub(crate) fn is_search_var(&self, var: VarId) -> bool {
        self.defining_invariant[var].is_none()
    }

    pub(crate) fn defined_vars(&self, invariant_id: InvariantId) -> &[VarId] {
        &self.defined_vars[invariant_id]
    }

    pub(crate) fn incoming_arcs(&self, invariant_id: InvariantId) -> &[IncomingArc] {
        &self.inputs[invariant_id]
    }

    pub(crate) fn layer(&self, invariant_id: InvariantId) -> usize {
        self.layers[invariant_id]
    }

    pub(crate) fn num_layers(&self) -> usize {
        self.num_layers
    }

    pub(crate) fn topological_order(&self) -> &[InvariantId] {
        &self.topological_order
    }

    /// The index of the cyclic component of the invariant, if it is part of one.
    pub(crate) fn cyclic_component(&self, invariant_id: InvariantId) -> Option<usize> {
        self.cyclic_component.get(invariant_id).copied().flatten()
    }

    /// The members of the cyclic component of the invariant, if it is part of one.
    pub(crate) fn cyclic_component_of(&self, invariant_id: InvariantId) -> Option<&[InvariantId]> {
        self.cyclic_component(invariant_id)
            .map(|component| self.cyclic_components[component].as_slice())
    }

    pub(crate) fn search_vars(&self) -> &[VarId] {
        &self.search_vars
    }

    pub(crate) fn evaluation_vars(&self) -> &[VarId] {
        &self.evaluation_vars
    }

    /// The static arcs of `var` and its dynamic arcs which are active at `timestamp`.
    pub(crate) fn active_outgoing_arcs(
        &self,
        timestamp: Timestamp,
        var: VarId,
    ) -> impl Iterator<Item = OutgoingArc> + '_ {
        self.static_arcs[var]
            .iter()
            .copied()
            .chain(self.dynamic_arcs[var].active_arcs(timestamp))
    }

    /// Every outgoing arc of `var`, whether dynamic or not.
    pub(crate) fn all_outgoing_arcs(&self, var: VarId) -> impl Iterator<Item = OutgoingArc> + '_ {
        self.static_arcs[var]
            .iter()
            .copied()
            .chain(self.dynamic_arcs[var].all_arcs())
    }

    /// Whether the input is static, or dynamic and active at `timestamp`.
    pub(crate) fn is_input_active(
        &self,
        timestamp: Timestamp,
        invariant_id: InvariantId,
        local_id: LocalId,
    ) -> bool {
        let arc = self.inputs[invariant_id][local_id.index()];
        match arc.dynamic_index {
            Some(index) => self.dynamic_arcs[arc.source].is_active(timestamp, index),
            None => true,
        }
    }

    pub(crate) fn make_dynamic_input_active(
        &mut self,
        timestamp: Timestamp,
        invariant_id: InvariantId,
        local_id: LocalId,
    ) {
        let arc = self.inputs[invariant_id][local_id.index()];
        atoll_assert_simple!(
            arc.dynamic_index.is_some(),
            "input {local_id} of {invariant_id} is not dynamic"
        );

        if let Some(index) = arc.dynamic_index {
            self.dynamic_arcs[arc.source].make_active(timestamp, index);
            self.mark_touched(timestamp, arc.source);
        }
    }

    pub(crate) fn make_dynamic_input_inactive(
        &mut self,
        timestamp: Timestamp,
        invariant_id: InvariantId,
        local_id: LocalId,
    ) {
        let arc = self.inputs[invariant_id][local_id.index()];
        atoll_assert_simple!(
            arc.dynamic_index.is_some(),
            "input {local_id} of {invariant_id} is not dynamic"
        );

        if let Some(index) = arc.dynamic_index {
            self.dynamic_arcs[arc.source].make_inactive(timestamp, index);
            self.mark_touched(timestamp, arc.source);
        }
    }

    pub(crate) fn make_all_dynamic_inputs_inactive(
        &mut self,
        timestamp: Timestamp,
        invariant_id: InvariantId,
    ) {
        for local_index in 0..self.inputs[invariant_id].len() {
            let arc = self.inputs[invariant_id][local_index];
            if let Some(index) = arc.dynamic_index {
                self.dynamic_arcs[arc.source].make_inactive(timestamp, index);
                self.mark_touched(timestamp, arc.source);
            }
        }
    }

    /// Commits the dynamic arcs which changed at `timestamp`.
    pub(crate) fn commit_dynamic_arcs(&mut self, timestamp: Timestamp) {
        if self.touched_timestamp != timestamp {
            return;
        }
        for var in self.touched_dynamic_vars.drain(..) {
            self.dynamic_arcs[var].commit_if(timestamp);
        }
    }

    pub(crate) fn commit_all_dynamic_arcs(&mut self, timestamp: Timestamp) {
        self.dynamic_arcs
            .iter_mut()
            .for_each(|arcs| arcs.commit_if(timestamp));
        self.touched_dynamic_vars.clear();
    }

    fn mark_touched(&mut self, timestamp: Timestamp, var: VarId) {
        if self.touched_timestamp != timestamp {
            self.touched_dynamic_vars.clear();
            self.touched_timestamp = timestamp;
        }
        if self.touched_at[var] != timestamp {
            self.touched_at[var] = timestamp;
            self.touched_dynamic_vars.push(var);
        }
    }
}
