use super::InvariantId;
use super::LocalId;
use super::VarId;
use super::VarViewId;
use crate::atoll_asserts::atoll_assert_advanced;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::StorageKey;
use crate::engine::PropagationGraph;
use crate::engine::VariableStore;

/// Read access to the values and bounds of variables and views at a timestamp.
pub trait ReadValues {
    fn variables(&self) -> &VariableStore;

    fn timestamp(&self) -> Timestamp;

    /// The value of `id` at the timestamp of this context.
    fn value(&self, id: VarViewId) -> i64 {
        self.variables().value(self.timestamp(), id)
    }

    fn committed_value(&self, id: VarViewId) -> i64 {
        self.variables().committed_value(id)
    }

    fn lower_bound(&self, id: VarViewId) -> i64 {
        self.variables().lower_bound(id)
    }

    fn upper_bound(&self, id: VarViewId) -> i64 {
        self.variables().upper_bound(id)
    }
}

/// An input declared through a [`RegistrationContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct InputRegistration {
    pub(crate) id: VarViewId,
    pub(crate) source: VarId,
    pub(crate) is_dynamic: bool,
}

/// The context in which an invariant declares its inputs and defined variables.
///
/// Nothing is written to the dependency graph until the whole registration succeeded, so a
/// failing registration leaves the solver unchanged.
#[derive(Debug)]
pub struct RegistrationContext<'a> {
    invariant_id: InvariantId,
    variables: &'a VariableStore,
    inputs: Vec<InputRegistration>,
    defined_vars: Vec<VarId>,
}

impl<'a> RegistrationContext<'a> {
    pub(crate) fn new(invariant_id: InvariantId, variables: &'a VariableStore) -> Self {
        RegistrationContext {
            invariant_id,
            variables,
            inputs: vec![],
            defined_vars: vec![],
        }
    }

    /// The id the invariant will receive.
    pub fn invariant_id(&self) -> InvariantId {
        self.invariant_id
    }

    /// Registers an input which is relevant at every timestamp.
    pub fn register_static_input(&mut self, id: VarViewId) -> Result<LocalId, EngineError> {
        self.register_input(id, false)
    }

    /// Registers an input which only notifies the invariant while it is active. Dynamic inputs
    /// start out inactive.
    pub fn register_dynamic_input(&mut self, id: VarViewId) -> Result<LocalId, EngineError> {
        self.register_input(id, true)
    }

    /// Registers a variable which is defined by the invariant.
    pub fn register_defined_var(&mut self, id: VarViewId) -> Result<VarId, EngineError> {
        match id {
            VarViewId::View(view) => Err(EngineError::DefinedVarIsView(view)),
            VarViewId::Var(var) => {
                if !self.variables.contains(id) {
                    return Err(EngineError::UnknownId(id));
                }
                self.defined_vars.push(var);
                Ok(var)
            }
        }
    }

    pub(crate) fn into_registration(self) -> (Vec<InputRegistration>, Vec<VarId>) {
        (self.inputs, self.defined_vars)
    }

    fn register_input(&mut self, id: VarViewId, is_dynamic: bool) -> Result<LocalId, EngineError> {
        if !self.variables.contains(id) {
            return Err(EngineError::UnknownId(id));
        }

        let local_id = LocalId::create_from_index(self.inputs.len());
        self.inputs.push(InputRegistration {
            id,
            source: self.variables.source_id(id),
            is_dynamic,
        });

        Ok(local_id)
    }
}

/// The context in which an invariant sets the bounds of its defined variables.
#[derive(Debug)]
pub struct BoundsContext<'a> {
    pub(crate) timestamp: Timestamp,
    pub(crate) widen_only: bool,
    pub(crate) variables: &'a mut VariableStore,
}

impl BoundsContext<'_> {
    /// Whether the bounds may only be widened. When `false`, the new bounds replace the old ones.
    pub fn widen_only(&self) -> bool {
        self.widen_only
    }

    /// Sets the bounds of a defined variable.
    pub fn set_bounds(
        &mut self,
        id: VarViewId,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<(), EngineError> {
        match id {
            VarViewId::View(view) => Err(EngineError::DefinedVarIsView(view)),
            VarViewId::Var(var) => self.variables.int_var_mut(var).update_bounds(
                lower_bound,
                upper_bound,
                self.widen_only,
            ),
        }
    }
}

impl ReadValues for BoundsContext<'_> {
    fn variables(&self) -> &VariableStore {
        self.variables
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// The context in which an invariant is evaluated.
///
/// It gives read access to all variables and views at the current timestamp, write access to the
/// variables defined by the invariant, and control over which dynamic inputs are active.
#[derive(Debug)]
pub struct InvariantContext<'a> {
    pub(crate) timestamp: Timestamp,
    pub(crate) invariant_id: InvariantId,
    pub(crate) variables: &'a mut VariableStore,
    pub(crate) graph: &'a mut PropagationGraph,
}

impl<'a> InvariantContext<'a> {
    pub(crate) fn new(
        timestamp: Timestamp,
        invariant_id: InvariantId,
        variables: &'a mut VariableStore,
        graph: &'a mut PropagationGraph,
    ) -> Self {
        InvariantContext {
            timestamp,
            invariant_id,
            variables,
            graph,
        }
    }

    pub fn invariant_id(&self) -> InvariantId {
        self.invariant_id
    }

    /// Sets the value of a defined variable at the current timestamp.
    pub fn update_value(&mut self, id: VarViewId, value: i64) {
        let var = self.defined_var(id);
        self.variables
            .int_var_mut(var)
            .set_value(self.timestamp, value);
    }

    /// Adds `delta` to the value of a defined variable at the current timestamp.
    pub fn inc_value(&mut self, id: VarViewId, delta: i64) {
        let var = self.defined_var(id);
        let _ = self
            .variables
            .int_var_mut(var)
            .inc_value(self.timestamp, delta);
    }

    pub fn make_dynamic_input_active(&mut self, local_id: LocalId) {
        self.graph
            .make_dynamic_input_active(self.timestamp, self.invariant_id, local_id);
    }

    pub fn make_dynamic_input_inactive(&mut self, local_id: LocalId) {
        self.graph
            .make_dynamic_input_inactive(self.timestamp, self.invariant_id, local_id);
    }

    pub fn make_all_dynamic_inputs_inactive(&mut self) {
        self.graph
            .make_all_dynamic_inputs_inactive(self.timestamp, self.invariant_id);
    }

    fn defined_var(&self, id: VarViewId) -> VarId {
        match id {
            VarViewId::Var(var) => {
                atoll_assert_advanced!(
                    self.graph.defining_invariant(var) == Some(self.invariant_id),
                    "{} wrote {var}, which it does not define",
                    self.invariant_id
                );
                var
            }
            VarViewId::View(view) => panic!(
                "{} attempted to write {view}; views cannot be defined",
                self.invariant_id
            ),
        }
    }
}

impl ReadValues for InvariantContext<'_> {
    fn variables(&self) -> &VariableStore {
        self.variables
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
