mod cyclic_component_evaluator;
mod int_var;
mod layered_queue;
mod output_to_input_explorer;
mod propagation_graph;
mod solver;
mod solver_options;
mod solver_state;
mod solver_statistics;
mod store;
#[cfg(test)]
pub(crate) mod test_helpers;
mod variable_store;

pub(crate) use cyclic_component_evaluator::CyclicComponentEvaluator;
pub(crate) use cyclic_component_evaluator::EvaluationContext;
pub(crate) use int_var::IntVar;
pub(crate) use layered_queue::LayeredQueue;
pub(crate) use output_to_input_explorer::ExplorationContext;
pub(crate) use output_to_input_explorer::OutputToInputExplorer;
pub(crate) use propagation_graph::Layering;
pub(crate) use propagation_graph::PropagationGraph;
pub use solver::Solver;
pub use solver_options::OutputToInputMarkingMode;
pub use solver_options::PropagationMode;
pub use solver_options::SolverOptions;
pub use solver_state::SolverState;
pub(crate) use solver_statistics::EngineStatistics;
pub use store::InvariantHandle;
pub(crate) use store::Store;
pub use variable_store::VariableStore;
