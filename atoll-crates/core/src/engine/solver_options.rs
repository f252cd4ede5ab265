#[cfg(doc)]
use crate::propagation::Invariant;
#[cfg(doc)]
use crate::Solver;

/// The algorithm used by probes.
///
/// Commits always propagate input-to-output, so that every consequence of the move becomes part
/// of the committed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PropagationMode {
    /// Starting from the modified search variables, every affected invariant is notified in
    /// layer order.
    #[default]
    InputToOutput,
    /// Starting from the queried variables, the explorer walks backward to the modified search
    /// variables through the inputs reported by [`Invariant::next_input`], and evaluates only
    /// the invariants it visits.
    OutputToInput,
}

/// Determines which inputs the output-to-input explorer skips because they cannot have changed.
///
/// The mode does not influence the values which are computed, only the amount of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputToInputMarkingMode {
    /// Every relevant input is explored.
    #[default]
    None,
    /// When the solver is closed, the search variables from which every variable can be reached
    /// are computed; a variable is explored if one of them is modified.
    OutputToInputStatic,
    /// Before every output-to-input propagation, the variables reachable from the modified
    /// search variables are marked; only marked variables are explored.
    InputToOutputExploration,
}

/// The options which can be provided to a [`Solver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverOptions {
    pub propagation_mode: PropagationMode,
    pub output_to_input_marking_mode: OutputToInputMarkingMode,
}

impl std::fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropagationMode::InputToOutput => write!(f, "input-to-output"),
            PropagationMode::OutputToInput => write!(f, "output-to-input"),
        }
    }
}

impl std::fmt::Display for OutputToInputMarkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputToInputMarkingMode::None => write!(f, "none"),
            OutputToInputMarkingMode::OutputToInputStatic => write!(f, "output-to-input-static"),
            OutputToInputMarkingMode::InputToOutputExploration => {
                write!(f, "input-to-output-exploration")
            }
        }
    }
}
