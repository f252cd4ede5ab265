//! Contains the building blocks for implementing invariants and views.
//!
//! An invariant implements [`Invariant`]: it declares its inputs and defined variables during
//! registration and afterwards keeps its defined variables consistent with its inputs, either by
//! recomputing from scratch or incrementally when notified of a changed input. It interacts with
//! the engine only through the context structures in this module.
//!
//! A view implements [`IntView`]; it is a pure function of a single parent variable or view.
mod committable_int;
mod contexts;
mod input_cursor;
mod int_view;
mod invariant;
mod invariant_id;
mod local_id;
mod occurrence_counts;
mod var_id;

pub use committable_int::CommittableInt;
pub use contexts::BoundsContext;
pub use contexts::InvariantContext;
pub use contexts::ReadValues;
pub use contexts::RegistrationContext;
pub(crate) use contexts::InputRegistration;
pub use input_cursor::InputCursor;
pub use int_view::IntView;
pub use invariant::Invariant;
pub use invariant::NotificationPolicy;
pub use invariant::ViolationInvariant;
pub use invariant_id::InvariantId;
pub use local_id::LocalId;
pub(crate) use occurrence_counts::OccurrenceCounts;
pub use var_id::VarId;
pub use var_id::VarViewId;
pub use var_id::ViewId;

pub use crate::engine::VariableStore;
