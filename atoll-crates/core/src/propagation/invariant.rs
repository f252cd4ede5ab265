use downcast_rs::Downcast;
use downcast_rs::impl_downcast;

use super::BoundsContext;
use super::InvariantContext;
use super::LocalId;
use super::RegistrationContext;
use super::VarViewId;
use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
#[cfg(doc)]
use crate::propagation::CommittableInt;
#[cfg(doc)]
use crate::propagation::InputCursor;
#[cfg(doc)]
use crate::OutputToInputMarkingMode;
#[cfg(doc)]
use crate::PropagationMode;

// We need to use this to cast from `Box<dyn Invariant>` to a concrete invariant.
impl_downcast!(Invariant);

/// How the engine informs an invariant of several changed inputs within one eager propagation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NotificationPolicy {
    /// Call [`Invariant::notify_input_changed`] once for every changed input.
    #[default]
    Incremental,
    /// Call [`Invariant::recompute`] when more than one input changed.
    RecomputeOnMultipleChanges,
}

/// An invariant defines one or more variables as a function of its inputs.
///
/// The engine calls into an invariant in the following order:
/// 1. [`Invariant::register_vars`] once, when the invariant is added to the solver;
/// 2. [`Invariant::update_bounds`] after registration and again when the solver is closed;
/// 3. [`Invariant::close`] and then [`Invariant::recompute`] when the solver is closed;
/// 4. during propagation, either [`Invariant::notify_input_changed`] (input-to-output, see
///    [`PropagationMode`]) or the pull protocol [`Invariant::next_input`] /
///    [`Invariant::notify_current_input_changed`] (output-to-input);
/// 5. [`Invariant::commit`] whenever a move that touched the invariant is committed.
///
/// The central correctness requirement is that the incremental paths produce exactly the values
/// which [`Invariant::recompute`] would produce for the same inputs. Auxiliary state should be kept
/// in [`CommittableInt`]s, so that it is both discarded when a probe is abandoned and unaffected
/// when the same input change is reported twice at one timestamp.
pub trait Invariant: Downcast {
    /// Returns the name of the invariant, used for logging.
    fn name(&self) -> &str;

    /// Declares the inputs and the defined variables of the invariant.
    ///
    /// Inputs receive [`LocalId`]s in the order in which they are registered. Dynamic inputs
    /// only notify the invariant while they are active, see
    /// [`InvariantContext::make_dynamic_input_active`].
    fn register_vars(&mut self, context: &mut RegistrationContext<'_>) -> Result<(), EngineError>;

    /// Sets the bounds of the defined variables based on the bounds of the inputs.
    fn update_bounds(&mut self, context: BoundsContext<'_>) -> Result<(), EngineError>;

    /// Called once when the solver is closed, after all bounds are computed and before the first
    /// [`Invariant::recompute`]. Invariants use this to size internal structures, and fail if
    /// the bounds of their inputs are too wide for them.
    fn close(&mut self, _context: InvariantContext<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Recomputes the defined variables from scratch at the timestamp of the context.
    fn recompute(&mut self, context: InvariantContext<'_>);

    /// Incrementally updates the defined variables given that the input with `local_id` changed.
    fn notify_input_changed(&mut self, context: InvariantContext<'_>, local_id: LocalId);

    /// Returns the next input which is relevant at the timestamp of the context, or `None` when
    /// all relevant inputs were returned. Dynamic invariants only return their active inputs.
    ///
    /// This is used by the output-to-input explorer, see [`OutputToInputMarkingMode`]; an
    /// [`InputCursor`] keeps track of the position.
    fn next_input(&mut self, context: InvariantContext<'_>) -> Option<VarViewId>;

    /// Informs the invariant that the input most recently returned by
    /// [`Invariant::next_input`] changed.
    fn notify_current_input_changed(&mut self, context: InvariantContext<'_>);

    /// Promotes the internal state written at `timestamp`.
    fn commit(&mut self, _timestamp: Timestamp) {}

    fn notification_policy(&self) -> NotificationPolicy {
        NotificationPolicy::default()
    }
}

/// An invariant whose (first) defined variable measures how much a constraint is violated, where
/// `0` means the constraint is satisfied.
///
/// The engine schedules violation invariants exactly like every other invariant; the solver only
/// keeps track of their violation variables.
pub trait ViolationInvariant: Invariant {
    fn violation_id(&self) -> VarViewId;
}
