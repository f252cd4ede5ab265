use log::debug;
use log::info;
use log::trace;

use super::CyclicComponentEvaluator;
use super::EngineStatistics;
use super::EvaluationContext;
use super::ExplorationContext;
use super::InvariantHandle;
use super::LayeredQueue;
use super::Layering;
use super::OutputToInputExplorer;
use super::OutputToInputMarkingMode;
use super::PropagationGraph;
use super::PropagationMode;
use super::SolverOptions;
use super::SolverState;
use super::Store;
use crate::atoll_asserts::atoll_assert_extreme;
use crate::atoll_asserts::print_atoll_assert_warning_message;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::containers::HashSet;
use crate::propagation::BoundsContext;
use crate::propagation::IntView;
use crate::propagation::Invariant;
use crate::propagation::InvariantContext;
use crate::propagation::InvariantId;
use crate::propagation::LocalId;
use crate::propagation::NotificationPolicy;
use crate::propagation::RegistrationContext;
use crate::propagation::VarId;
use crate::propagation::VarViewId;
use crate::propagation::ViolationInvariant;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The incremental propagation engine.
///
/// A solver goes through two phases. While it is *open*, variables, views and invariants are
/// registered. [`Solver::close`] then orders the invariants, computes all bounds and evaluates the
/// model once; from then on the model is fixed and the solver only runs transactions:
///
/// ```text
/// begin_move  -> set_value*  -> end_move
/// begin_probe -> query*      -> end_probe
/// begin_commit -> query*     -> end_commit
/// ```
///
/// A move starts a new timestamp; every pending value written during a move, probe or commit is
/// stamped with it. Values with an outdated stamp read as their committed value, so abandoning a
/// move needs no undo. A commit propagates the move and promotes every pending value.
#[derive(Debug)]
pub struct Solver {
    store: Store,
    graph: PropagationGraph,
    explorer: OutputToInputExplorer,
    queue: LayeredQueue,
    cyclic_evaluator: CyclicComponentEvaluator,
    options: SolverOptions,

    state: SolverState,
    current_timestamp: Timestamp,
    /// The search variables whose pending value differs from their committed value.
    modified_search_vars: HashSet<VarId>,
    violation_vars: Vec<VarId>,

    touched_vars: Vec<VarId>,
    touched_invariants: Vec<InvariantId>,
    changed_inputs: Vec<LocalId>,

    statistics: EngineStatistics,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverOptions::default())
    }
}

impl Solver {
    pub fn new(options: SolverOptions) -> Self {
        print_atoll_assert_warning_message!();

        Solver {
            store: Store::default(),
            graph: PropagationGraph::default(),
            explorer: OutputToInputExplorer::default(),
            queue: LayeredQueue::default(),
            cyclic_evaluator: CyclicComponentEvaluator::default(),
            options,
            state: SolverState::Idle,
            current_timestamp: Timestamp::NULL.next(),
            modified_search_vars: HashSet::default(),
            violation_vars: vec![],
            touched_vars: vec![],
            touched_invariants: vec![],
            changed_inputs: vec![],
            statistics: EngineStatistics::default(),
        }
    }

    /// Starts the modelling phase. A solver can only be opened once.
    pub fn open(&mut self) -> Result<(), EngineError> {
        if self.graph.is_closed() {
            return Err(EngineError::SolverClosed);
        }
        if self.state == SolverState::Open {
            return Err(EngineError::SolverAlreadyOpen);
        }

        self.state = SolverState::Open;
        Ok(())
    }

    /// Creates a variable with the given initial value and domain `[lower_bound, upper_bound]`.
    pub fn make_int_var(
        &mut self,
        initial_value: i64,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<VarViewId, EngineError> {
        self.ensure_open()?;

        let var = self.store.variables.create_int_var(
            self.current_timestamp,
            initial_value,
            lower_bound,
            upper_bound,
        )?;
        self.graph.register_var(var);

        debug!("Created {var} with value {initial_value} in [{lower_bound}, {upper_bound}]");
        Ok(var.into())
    }

    pub fn make_int_view<V: IntView + 'static>(&mut self, view: V) -> Result<VarViewId, EngineError> {
        self.ensure_open()?;

        let name = view.name().to_owned();
        let view = self.store.variables.create_int_view(Box::new(view))?;

        debug!("Created {name} as {view}");
        Ok(view.into())
    }

    /// Adds an invariant to the model.
    ///
    /// Either the invariant is fully registered, or an error is returned and the model is left as
    /// it was.
    pub fn make_invariant<T: Invariant>(
        &mut self,
        mut invariant: T,
    ) -> Result<InvariantHandle<T>, EngineError> {
        self.ensure_open()?;

        let slot = self.store.invariants.new_invariant::<T>();
        let invariant_id = slot.id();

        let mut registration = RegistrationContext::new(invariant_id, &self.store.variables);
        invariant.register_vars(&mut registration)?;
        let (inputs, defined_vars) = registration.into_registration();

        self.graph
            .validate_invariant(invariant_id, &inputs, &defined_vars)?;
        invariant.update_bounds(BoundsContext {
            timestamp: self.current_timestamp,
            widen_only: false,
            variables: &mut self.store.variables,
        })?;
        self.graph.add_invariant(invariant_id, &inputs, defined_vars);

        debug!(
            "Created {} as {invariant_id} with {} inputs",
            invariant.name(),
            inputs.len()
        );
        Ok(slot.populate(invariant))
    }

    /// Adds an invariant and records its violation variable.
    pub fn make_violation_invariant<T: ViolationInvariant>(
        &mut self,
        invariant: T,
    ) -> Result<InvariantHandle<T>, EngineError> {
        let violation_id = invariant.violation_id();
        let handle = self.make_invariant(invariant)?;
        self.violation_vars
            .push(self.store.variables.source_id(violation_id));
        Ok(handle)
    }

    /// Changes the domain of a variable while the solver is open.
    ///
    /// With `widen_only`, the domain becomes the union of the old and the new domain.
    pub fn update_bounds(
        &mut self,
        id: impl Into<VarViewId>,
        lower_bound: i64,
        upper_bound: i64,
        widen_only: bool,
    ) -> Result<(), EngineError> {
        self.ensure_open()?;

        let id = id.into();
        if !self.store.variables.contains(id) {
            return Err(EngineError::UnknownId(id));
        }
        match id {
            VarViewId::View(view) => Err(EngineError::BoundsOfView(view)),
            VarViewId::Var(var) => self.store.variables.int_var_mut(var).update_bounds(
                lower_bound,
                upper_bound,
                widen_only,
            ),
        }
    }

    /// Widens the bounds of every defined variable to what its invariant can produce given the
    /// bounds of its inputs.
    pub fn compute_bounds(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;

        let layering = self.graph.compute_layering()?;
        self.update_invariant_bounds(&layering, true)
    }

    /// Ends the modelling phase.
    ///
    /// Closing orders the invariants by their dependencies (failing on a cycle of static inputs),
    /// computes the bounds of all defined variables and evaluates every invariant from scratch.
    /// The resulting values become the committed state. If the initial values activate a cycle of
    /// dynamic inputs, the solver stays open.
    pub fn close(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;

        let layering = self.graph.compute_layering()?;
        self.update_invariant_bounds(&layering, false)?;
        self.graph.close(layering);

        self.queue = LayeredQueue::new(self.graph.num_layers(), self.graph.num_invariants());
        self.explorer =
            OutputToInputExplorer::new(&self.graph, self.options.output_to_input_marking_mode);
        self.cyclic_evaluator = CyclicComponentEvaluator::new(self.graph.num_invariants());

        self.current_timestamp = self.current_timestamp.next();
        let timestamp = self.current_timestamp;

        if let Err(error) = self.evaluate_from_scratch() {
            self.graph.reopen();
            return Err(error);
        }

        self.store
            .variables
            .int_vars_mut()
            .for_each(|var| var.commit());
        self.store
            .invariants
            .iter_invariants_mut()
            .for_each(|invariant| invariant.commit(timestamp));
        self.graph.commit_all_dynamic_arcs(timestamp);

        self.state = SolverState::Idle;
        info!(
            "Closed the solver with {} variables ({} search variables), {} views and {} invariants in {} layers",
            self.num_vars(),
            self.graph.search_vars().len(),
            self.num_views(),
            self.num_invariants(),
            self.graph.num_layers()
        );
        Ok(())
    }

    /// Starts a new move at a fresh timestamp, which discards every uncommitted value.
    pub fn begin_move(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("begin a move")?;

        self.current_timestamp = self.current_timestamp.next();
        self.modified_search_vars.clear();
        self.statistics.num_moves += 1;
        self.state = SolverState::Move;
        Ok(())
    }

    /// Assigns a search variable within the current move.
    pub fn set_value(&mut self, id: impl Into<VarViewId>, value: i64) -> Result<(), EngineError> {
        let id = id.into();
        self.ensure_state(SolverState::Move, "set a value")?;
        if !self.store.variables.contains(id) {
            return Err(EngineError::UnknownId(id));
        }
        let VarViewId::Var(var) = id else {
            return Err(EngineError::NotASearchVar(id));
        };
        if !self.graph.is_search_var(var) {
            return Err(EngineError::NotASearchVar(id));
        }

        let timestamp = self.current_timestamp;
        let int_var = self.store.variables.int_var_mut(var);
        if !int_var.in_domain(value) {
            return Err(EngineError::ValueOutOfDomain {
                value,
                lower_bound: int_var.lower_bound(),
                upper_bound: int_var.upper_bound(),
            });
        }

        int_var.set_value(timestamp, value);
        if int_var.has_changed(timestamp) {
            let _ = self.modified_search_vars.insert(var);
        } else {
            let _ = self.modified_search_vars.remove(&var);
        }
        Ok(())
    }

    pub fn end_move(&mut self) -> Result<(), EngineError> {
        self.ensure_state(SolverState::Move, "end a move")?;
        self.state = SolverState::Idle;
        Ok(())
    }

    /// Starts a probe of the current move. Only the variables passed to [`Solver::query`] are
    /// guaranteed to be correct after [`Solver::end_probe`].
    pub fn begin_probe(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("begin a probe")?;

        self.explorer.clear_registered_vars();
        self.statistics.num_probes += 1;
        self.state = SolverState::Probe;
        Ok(())
    }

    /// Requests that `id` is propagated by the current probe or commit.
    pub fn query(&mut self, id: impl Into<VarViewId>) -> Result<(), EngineError> {
        let id = id.into();
        if !matches!(self.state, SolverState::Probe | SolverState::Commit) {
            return Err(EngineError::InvalidState {
                operation: "query",
                state: self.state,
            });
        }
        if !self.store.variables.contains(id) {
            return Err(EngineError::UnknownId(id));
        }

        if self.state == SolverState::Probe
            && self.options.propagation_mode == PropagationMode::OutputToInput
        {
            self.explorer
                .register_for_propagation(self.store.variables.source_id(id));
        }
        Ok(())
    }

    /// Propagates the current move; the committed state is left untouched.
    ///
    /// If the move activates a cycle of dynamic inputs, the probe fails and the next probe needs
    /// a new move.
    pub fn end_probe(&mut self) -> Result<(), EngineError> {
        self.ensure_state(SolverState::Probe, "end a probe")?;

        self.state = SolverState::Processing;
        let result = match self.options.propagation_mode {
            PropagationMode::InputToOutput => self.propagate_input_to_output(false),
            PropagationMode::OutputToInput => self.propagate_output_to_input(),
        };
        self.state = SolverState::Idle;
        result
    }

    /// Starts committing the current move.
    pub fn begin_commit(&mut self) -> Result<(), EngineError> {
        self.ensure_idle("begin a commit")?;

        self.statistics.num_commits += 1;
        self.state = SolverState::Commit;
        Ok(())
    }

    /// Propagates the current move to every affected variable and makes the result the committed
    /// state. A commit always propagates eagerly, regardless of the propagation mode.
    ///
    /// If the move activates a cycle of dynamic inputs, nothing is committed.
    pub fn end_commit(&mut self) -> Result<(), EngineError> {
        self.ensure_state(SolverState::Commit, "end a commit")?;

        self.state = SolverState::Processing;
        let result = self.propagate_input_to_output(true);
        self.state = SolverState::Idle;
        result
    }

    /// The value of `id` at the current timestamp.
    ///
    /// # Panics
    /// If `id` does not belong to this solver.
    pub fn current_value(&self, id: impl Into<VarViewId>) -> i64 {
        self.store
            .variables
            .value(self.current_timestamp, id.into())
    }

    pub fn committed_value(&self, id: impl Into<VarViewId>) -> i64 {
        self.store.variables.committed_value(id.into())
    }

    pub fn lower_bound(&self, id: impl Into<VarViewId>) -> i64 {
        self.store.variables.lower_bound(id.into())
    }

    pub fn upper_bound(&self, id: impl Into<VarViewId>) -> i64 {
        self.store.variables.upper_bound(id.into())
    }

    /// The variable at the bottom of the parent chain of `id`.
    pub fn source_id(&self, id: impl Into<VarViewId>) -> VarId {
        self.store.variables.source_id(id.into())
    }

    /// The variables without a defining invariant. Empty until the solver is closed.
    pub fn search_vars(&self) -> &[VarId] {
        self.graph.search_vars()
    }

    /// The variables which no invariant reads. Empty until the solver is closed.
    pub fn evaluation_vars(&self) -> &[VarId] {
        self.graph.evaluation_vars()
    }

    /// The violation variables of all violation invariants, in registration order.
    pub fn violation_vars(&self) -> &[VarId] {
        &self.violation_vars
    }

    /// The search variables whose value differs from their committed value in the current move.
    pub fn modified_search_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.modified_search_vars.iter().copied()
    }

    pub fn defining_invariant(&self, id: impl Into<VarViewId>) -> Option<InvariantId> {
        self.graph
            .defining_invariant(self.store.variables.source_id(id.into()))
    }

    pub fn vars_defined_by(&self, invariant_id: InvariantId) -> &[VarId] {
        self.graph.defined_vars(invariant_id)
    }

    /// The inputs of an invariant as registered, in [`LocalId`] order.
    pub fn input_vars(&self, invariant_id: InvariantId) -> impl Iterator<Item = VarViewId> + '_ {
        self.graph
            .incoming_arcs(invariant_id)
            .iter()
            .map(|arc| arc.id)
    }

    /// The layer of an invariant; only meaningful once the solver is closed.
    pub fn layer(&self, invariant_id: InvariantId) -> usize {
        self.graph.layer(invariant_id)
    }

    pub fn num_layers(&self) -> usize {
        self.graph.num_layers()
    }

    pub fn num_vars(&self) -> usize {
        self.store.variables.num_vars()
    }

    pub fn num_views(&self) -> usize {
        self.store.variables.num_views()
    }

    pub fn num_invariants(&self) -> usize {
        self.store.invariants.num_invariants()
    }

    pub fn current_timestamp(&self) -> Timestamp {
        self.current_timestamp
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SolverState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.graph.is_closed()
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.options.propagation_mode
    }

    /// Selects how probes propagate. Can only be changed before the solver is closed.
    pub fn set_propagation_mode(&mut self, mode: PropagationMode) -> Result<(), EngineError> {
        if self.is_closed() {
            return Err(EngineError::SolverClosed);
        }
        self.options.propagation_mode = mode;
        Ok(())
    }

    pub fn output_to_input_marking_mode(&self) -> OutputToInputMarkingMode {
        self.options.output_to_input_marking_mode
    }

    /// Selects how output-to-input propagation prunes its exploration. Can only be changed
    /// before the solver is closed.
    pub fn set_output_to_input_marking_mode(
        &mut self,
        mode: OutputToInputMarkingMode,
    ) -> Result<(), EngineError> {
        if self.is_closed() {
            return Err(EngineError::SolverClosed);
        }
        self.options.output_to_input_marking_mode = mode;
        Ok(())
    }

    /// Returns the invariant behind `handle`.
    pub fn invariant<T: Invariant>(&self, handle: InvariantHandle<T>) -> Option<&T> {
        self.store.invariants.get_invariant(handle)
    }

    /// Logs the engine statistics, if statistic logging is configured.
    pub fn log_statistics(&self) {
        if should_log_statistics() {
            self.statistics.log(StatisticLogger::new("engine"));
            log_statistic_postfix();
        }
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.graph.is_closed() {
            return Err(EngineError::SolverClosed);
        }
        if self.state != SolverState::Open {
            return Err(EngineError::SolverNotOpen);
        }
        Ok(())
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), EngineError> {
        if !self.graph.is_closed() {
            return Err(EngineError::InvalidState {
                operation,
                state: self.state,
            });
        }
        self.ensure_state(SolverState::Idle, operation)
    }

    fn ensure_state(
        &self,
        expected: SolverState,
        operation: &'static str,
    ) -> Result<(), EngineError> {
        if self.state != expected {
            return Err(EngineError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Updates the bounds of the variables defined by the invariants in topological order.
    ///
    /// The members of a cyclic component read each other's bounds, so once the last member of a
    /// component is reached, the component is widened once more for every further member.
    fn update_invariant_bounds(
        &mut self,
        layering: &Layering,
        widen_only: bool,
    ) -> Result<(), EngineError> {
        for &invariant_id in layering.topological_order.iter() {
            self.update_bounds_of(invariant_id, widen_only)?;

            let Some(members) = layering.cyclic_component_of(invariant_id) else {
                continue;
            };
            if members.last() == Some(&invariant_id) {
                for _ in 1..members.len() {
                    for &member in members {
                        self.update_bounds_of(member, true)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn update_bounds_of(
        &mut self,
        invariant_id: InvariantId,
        widen_only: bool,
    ) -> Result<(), EngineError> {
        self.store.invariants[invariant_id].update_bounds(BoundsContext {
            timestamp: self.current_timestamp,
            widen_only,
            variables: &mut self.store.variables,
        })
    }

    /// Prepares every invariant for propagation and recomputes it, in topological order.
    fn evaluate_from_scratch(&mut self) -> Result<(), EngineError> {
        let timestamp = self.current_timestamp;

        for index in 0..self.graph.topological_order().len() {
            let invariant_id = self.graph.topological_order()[index];
            self.store.invariants[invariant_id].close(InvariantContext::new(
                timestamp,
                invariant_id,
                &mut self.store.variables,
                &mut self.graph,
            ))?;
        }

        for index in 0..self.graph.topological_order().len() {
            let invariant_id = self.graph.topological_order()[index];

            let Some(members) = self.graph.cyclic_component_of(invariant_id) else {
                self.store.invariants[invariant_id].recompute(InvariantContext::new(
                    timestamp,
                    invariant_id,
                    &mut self.store.variables,
                    &mut self.graph,
                ));
                continue;
            };
            if members.first() != Some(&invariant_id) {
                continue;
            }

            let members = members.to_vec();
            self.cyclic_evaluator.evaluate(
                &members,
                &mut EvaluationContext {
                    timestamp,
                    store: &mut self.store,
                    graph: &mut self.graph,
                    statistics: &mut self.statistics,
                },
            )?;
        }
        Ok(())
    }

    /// Eager propagation: every invariant reachable from the modified search variables through
    /// active arcs is evaluated once, in layer order.
    fn propagate_input_to_output(&mut self, commit: bool) -> Result<(), EngineError> {
        let timestamp = self.current_timestamp;
        self.queue.clear();
        self.touched_vars.clear();
        self.touched_invariants.clear();

        for &var in self.modified_search_vars.iter() {
            if self.store.variables.int_var(var).has_changed(timestamp) {
                enqueue_listeners(&self.graph, &mut self.queue, timestamp, var);
            }
        }

        while let Some(invariant_id) = self.queue.pop() {
            if self.graph.cyclic_component(invariant_id).is_some() {
                self.evaluate_cyclic_component(invariant_id, commit)?;
                continue;
            }

            self.queue
                .take_changed_inputs(invariant_id, &mut self.changed_inputs);
            self.evaluate(invariant_id);

            for &var in self.graph.defined_vars(invariant_id) {
                if self.store.variables.int_var(var).has_changed(timestamp) {
                    enqueue_listeners(&self.graph, &mut self.queue, timestamp, var);
                }
                if commit {
                    self.touched_vars.push(var);
                }
            }
            if commit {
                self.touched_invariants.push(invariant_id);
            }
        }

        if commit {
            self.commit_touched();
        }
        Ok(())
    }

    /// Evaluates the cyclic component of `first`, which was just popped from the queue.
    ///
    /// Every member which is enqueued, or which reads a member that is evaluated, is recomputed
    /// in the order of the active inputs. Afterwards the listeners outside the component are
    /// enqueued.
    fn evaluate_cyclic_component(
        &mut self,
        first: InvariantId,
        commit: bool,
    ) -> Result<(), EngineError> {
        let timestamp = self.current_timestamp;
        let layer = self.graph.layer(first);
        let members = self
            .graph
            .cyclic_component_of(first)
            .map(<[InvariantId]>::to_vec)
            .unwrap_or_default();

        self.queue.take_changed_inputs(first, &mut self.changed_inputs);
        let mut reached = vec![first];
        for &member in members.iter() {
            if member != first && self.queue.remove(member, layer) {
                reached.push(member);
            }
        }

        let mut index = 0;
        while let Some(&invariant_id) = reached.get(index) {
            index += 1;
            for &var in self.graph.defined_vars(invariant_id) {
                for arc in self.graph.all_outgoing_arcs(var) {
                    if members.contains(&arc.invariant_id) && !reached.contains(&arc.invariant_id)
                    {
                        reached.push(arc.invariant_id);
                    }
                }
            }
        }

        let stale = members
            .into_iter()
            .filter(|member| reached.contains(member))
            .collect::<Vec<_>>();
        self.cyclic_evaluator.evaluate(
            &stale,
            &mut EvaluationContext {
                timestamp,
                store: &mut self.store,
                graph: &mut self.graph,
                statistics: &mut self.statistics,
            },
        )?;
        trace!("Evaluated the cyclic component of {first} ({} members)", stale.len());

        for invariant_id in stale {
            for &var in self.graph.defined_vars(invariant_id) {
                if self.store.variables.int_var(var).has_changed(timestamp) {
                    enqueue_listeners(&self.graph, &mut self.queue, timestamp, var);
                }
                if commit {
                    self.touched_vars.push(var);
                }
            }
            if commit {
                self.touched_invariants.push(invariant_id);
            }
        }
        Ok(())
    }

    fn propagate_output_to_input(&mut self) -> Result<(), EngineError> {
        self.explorer.propagate(ExplorationContext {
            timestamp: self.current_timestamp,
            store: &mut self.store,
            graph: &mut self.graph,
            modified_search_vars: &self.modified_search_vars,
            statistics: &mut self.statistics,
        })
    }

    /// Informs the invariant of the inputs in `changed_inputs`.
    fn evaluate(&mut self, invariant_id: InvariantId) {
        let timestamp = self.current_timestamp;
        let invariant = &mut self.store.invariants[invariant_id];

        if self.changed_inputs.len() > 1
            && invariant.notification_policy() == NotificationPolicy::RecomputeOnMultipleChanges
        {
            self.statistics.num_recomputations += 1;
            invariant.recompute(InvariantContext::new(
                timestamp,
                invariant_id,
                &mut self.store.variables,
                &mut self.graph,
            ));
        } else {
            for &local_id in self.changed_inputs.iter() {
                self.statistics.num_notifications += 1;
                invariant.notify_input_changed(
                    InvariantContext::new(
                        timestamp,
                        invariant_id,
                        &mut self.store.variables,
                        &mut self.graph,
                    ),
                    local_id,
                );
            }
        }

        trace!(
            "Evaluated {} ({invariant_id}) for {} changed inputs",
            invariant.name(),
            self.changed_inputs.len()
        );
    }

    fn commit_touched(&mut self) {
        let timestamp = self.current_timestamp;

        for &var in self.modified_search_vars.iter() {
            self.store.variables.int_var_mut(var).commit_if(timestamp);
        }
        for var in self.touched_vars.drain(..) {
            self.store.variables.int_var_mut(var).commit_if(timestamp);
        }
        for invariant_id in self.touched_invariants.drain(..) {
            self.store.invariants[invariant_id].commit(timestamp);
        }
        self.graph.commit_dynamic_arcs(timestamp);
        self.modified_search_vars.clear();

        atoll_assert_extreme!(self
            .store
            .variables
            .var_ids()
            .all(|var| !self.store.variables.int_var(var).has_changed(timestamp)));
    }

    #[cfg(test)]
    pub(crate) fn recompute_invariant(&mut self, invariant_id: InvariantId) {
        self.store.invariants[invariant_id].recompute(InvariantContext::new(
            self.current_timestamp,
            invariant_id,
            &mut self.store.variables,
            &mut self.graph,
        ));
    }

    /// Drains [`Invariant::next_input`] of the invariant at the current timestamp.
    #[cfg(test)]
    pub(crate) fn next_inputs(&mut self, invariant_id: InvariantId) -> Vec<VarViewId> {
        std::iter::from_fn(|| {
            self.store.invariants[invariant_id].next_input(InvariantContext::new(
                self.current_timestamp,
                invariant_id,
                &mut self.store.variables,
                &mut self.graph,
            ))
        })
        .collect()
    }

    #[cfg(test)]
    pub(crate) fn is_input_active(&self, invariant_id: InvariantId, local_id: LocalId) -> bool {
        self.graph
            .is_input_active(self.current_timestamp, invariant_id, local_id)
    }

    #[cfg(test)]
    pub(crate) fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }
}

/// Enqueues the invariants which read `var` through an active arc. Members of the cyclic
/// component which defines `var` are evaluated together with it and are skipped.
fn enqueue_listeners(
    graph: &PropagationGraph,
    queue: &mut LayeredQueue,
    timestamp: Timestamp,
    var: VarId,
) {
    let component = graph
        .defining_invariant(var)
        .and_then(|definer| graph.cyclic_component(definer));

    for arc in graph.active_outgoing_arcs(timestamp, var) {
        if component.is_some() && graph.cyclic_component(arc.invariant_id) == component {
            continue;
        }
        queue.enqueue(arc.invariant_id, graph.layer(arc.invariant_id), arc.local_id);
    }
}

#[cfg(test)]
mod tests {
    use super::Solver;
    use crate::basic_types::EngineError;
    use crate::engine::SolverState;
    use crate::invariants::ElementVar;
    use crate::invariants::Linear;
    use crate::propagation::LocalId;
    use crate::violation_invariants::LessEqual;
    use crate::PropagationMode;
    use crate::SolverOptions;

    fn open_solver() -> Solver {
        let mut solver = Solver::default();
        solver.open().unwrap();
        solver
    }

    #[test]
    fn lifecycle_is_enforced() {
        let mut solver = Solver::default();
        assert_eq!(solver.make_int_var(0, 0, 1), Err(EngineError::SolverNotOpen));
        assert!(matches!(
            solver.begin_move(),
            Err(EngineError::InvalidState { .. })
        ));

        solver.open().unwrap();
        assert_eq!(solver.open(), Err(EngineError::SolverAlreadyOpen));
        let _ = solver.make_int_var(0, 0, 1).unwrap();
        solver.close().unwrap();

        assert_eq!(solver.open(), Err(EngineError::SolverClosed));
        assert_eq!(solver.make_int_var(0, 0, 1), Err(EngineError::SolverClosed));
        assert_eq!(solver.state(), SolverState::Idle);
        assert!(matches!(
            solver.end_move(),
            Err(EngineError::InvalidState {
                operation: "end a move",
                state: SolverState::Idle
            })
        ));
    }

    #[test]
    fn values_are_validated_in_a_move() {
        let mut solver = open_solver();
        let a = solver.make_int_var(0, 0, 5).unwrap();
        let s = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Linear::new(s, vec![1], vec![a]))
            .unwrap();
        solver.close().unwrap();

        assert!(solver.set_value(a, 1).is_err());

        solver.begin_move().unwrap();
        assert_eq!(solver.set_value(s, 1), Err(EngineError::NotASearchVar(s)));
        assert_eq!(
            solver.set_value(a, 6),
            Err(EngineError::ValueOutOfDomain {
                value: 6,
                lower_bound: 0,
                upper_bound: 5
            })
        );
        solver.set_value(a, 3).unwrap();
        assert_eq!(solver.modified_search_vars().count(), 1);
        solver.set_value(a, 0).unwrap();
        assert_eq!(solver.modified_search_vars().count(), 0);
        solver.end_move().unwrap();
    }

    #[test]
    fn probe_leaves_committed_state_untouched() {
        for mode in [PropagationMode::InputToOutput, PropagationMode::OutputToInput] {
            let mut solver = Solver::new(SolverOptions {
                propagation_mode: mode,
                ..Default::default()
            });
            solver.open().unwrap();
            let a = solver.make_int_var(1, 0, 5).unwrap();
            let b = solver.make_int_var(2, 0, 5).unwrap();
            let s = solver.make_int_var(0, 0, 0).unwrap();
            let _ = solver
                .make_invariant(Linear::new(s, vec![1, 1], vec![a, b]))
                .unwrap();
            solver.close().unwrap();
            assert_eq!(solver.committed_value(s), 3);

            solver.begin_move().unwrap();
            solver.set_value(a, 4).unwrap();
            solver.end_move().unwrap();
            solver.begin_probe().unwrap();
            solver.query(s).unwrap();
            solver.end_probe().unwrap();

            assert_eq!(solver.current_value(s), 6);
            assert_eq!(solver.committed_value(s), 3);

            // A new move discards the probed values.
            solver.begin_move().unwrap();
            solver.end_move().unwrap();
            assert_eq!(solver.current_value(s), 3);
            assert_eq!(solver.current_value(a), 1);
        }
    }

    #[test]
    fn commit_promotes_the_move() {
        let mut solver = open_solver();
        let a = solver.make_int_var(1, 0, 5).unwrap();
        let b = solver.make_int_var(2, 0, 5).unwrap();
        let s = solver.make_int_var(0, 0, 0).unwrap();
        let violation = solver.make_int_var(0, 0, 0).unwrap();
        let limit = solver.make_int_var(4, 0, 10).unwrap();
        let _ = solver
            .make_invariant(Linear::new(s, vec![1, 1], vec![a, b]))
            .unwrap();
        let _ = solver
            .make_violation_invariant(LessEqual::new(violation, s, limit))
            .unwrap();
        solver.close().unwrap();
        assert_eq!(solver.violation_vars(), &[violation.as_var().unwrap()]);
        assert_eq!(solver.committed_value(violation), 0);

        solver.begin_move().unwrap();
        solver.set_value(a, 5).unwrap();
        solver.end_move().unwrap();
        solver.begin_commit().unwrap();
        solver.query(violation).unwrap();
        solver.end_commit().unwrap();

        assert_eq!(solver.committed_value(a), 5);
        assert_eq!(solver.committed_value(s), 7);
        assert_eq!(solver.committed_value(violation), 3);

        solver.begin_move().unwrap();
        solver.end_move().unwrap();
        assert_eq!(solver.current_value(violation), 3);
        assert_eq!(solver.modified_search_vars().count(), 0);
    }

    #[test]
    fn eager_propagation_skips_unaffected_invariants() {
        let mut solver = open_solver();
        let a = solver.make_int_var(0, 0, 5).unwrap();
        let b = solver.make_int_var(0, 0, 5).unwrap();
        let x = solver.make_int_var(0, 0, 0).unwrap();
        let y = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Linear::new(x, vec![1], vec![a]))
            .unwrap();
        let _ = solver
            .make_invariant(Linear::new(y, vec![1], vec![b]))
            .unwrap();
        solver.close().unwrap();

        solver.begin_move().unwrap();
        solver.set_value(a, 2).unwrap();
        solver.end_move().unwrap();
        solver.begin_probe().unwrap();
        solver.end_probe().unwrap();

        assert_eq!(solver.current_value(x), 2);
        assert_eq!(solver.statistics().num_notifications, 1);
    }

    #[test]
    fn dynamic_inputs_follow_the_index() {
        let mut solver = open_solver();
        let cells = (0..3)
            .map(|value| solver.make_int_var(value * 10, 0, 30).unwrap())
            .collect::<Vec<_>>();
        let index = solver.make_int_var(1, 1, 3).unwrap();
        let output = solver.make_int_var(0, 0, 0).unwrap();
        let handle = solver
            .make_invariant(ElementVar::new(output, index, cells.clone(), 1))
            .unwrap();
        solver.close().unwrap();

        assert_eq!(solver.committed_value(output), 0);
        assert!(solver.is_input_active(handle.id(), LocalId::from(0)));
        assert!(!solver.is_input_active(handle.id(), LocalId::from(2)));

        solver.begin_move().unwrap();
        solver.set_value(index, 3).unwrap();
        solver.end_move().unwrap();
        solver.begin_commit().unwrap();
        solver.end_commit().unwrap();

        assert_eq!(solver.committed_value(output), 20);
        assert!(solver.is_input_active(handle.id(), LocalId::from(2)));
        assert!(!solver.is_input_active(handle.id(), LocalId::from(0)));

        // Changing an inactive cell does not notify the invariant.
        solver.begin_move().unwrap();
        solver.set_value(cells[0], 30).unwrap();
        solver.end_move().unwrap();
        let notifications = solver.statistics().num_notifications;
        solver.begin_probe().unwrap();
        solver.end_probe().unwrap();
        assert_eq!(solver.statistics().num_notifications, notifications);
        assert_eq!(solver.current_value(output), 20);
    }

    #[test]
    fn failed_registration_leaves_the_model_unchanged() {
        let mut solver = open_solver();
        let a = solver.make_int_var(0, 0, 5).unwrap();
        let s = solver.make_int_var(0, 0, 0).unwrap();
        let _ = solver
            .make_invariant(Linear::new(s, vec![1], vec![a]))
            .unwrap();

        let result = solver.make_invariant(Linear::new(s, vec![1], vec![a]));
        assert!(matches!(result, Err(EngineError::VarAlreadyDefined { .. })));
        assert_eq!(solver.num_invariants(), 1);

        solver.close().unwrap();
        assert_eq!(solver.search_vars(), &[a.as_var().unwrap()]);
    }

    #[test]
    fn widening_bounds_keeps_the_union() {
        let mut solver = open_solver();
        let a = solver.make_int_var(0, 0, 5).unwrap();
        solver.update_bounds(a, 2, 8, true).unwrap();
        assert_eq!((solver.lower_bound(a), solver.upper_bound(a)), (0, 8));
        solver.update_bounds(a, 2, 8, false).unwrap();
        assert_eq!((solver.lower_bound(a), solver.upper_bound(a)), (2, 8));
    }
}
