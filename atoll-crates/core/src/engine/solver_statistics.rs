use crate::create_statistics_struct;

create_statistics_struct!(
    /// Counters of the work performed by the engine.
    EngineStatistics {
        /// The number of moves
        num_moves: usize,
        /// The number of probes
        num_probes: usize,
        /// The number of commits
        num_commits: usize,
        /// The number of times an invariant was notified of a changed input
        num_notifications: usize,
        /// The number of times an invariant was recomputed from scratch
        num_recomputations: usize,
        /// The number of inputs the output-to-input explorer visited
        num_explored_inputs: usize,
    }
);
