//! Invariants which define variables as functions of their inputs.
//!
//! Each invariant keeps the auxiliary state it needs for incremental updates in
//! [`CommittableInt`](crate::propagation::CommittableInt)s, so that abandoning a probe discards it
//! together with the pending values of the variables.
mod count;
mod element_2d_var;
mod element_var;
mod if_then_else;
mod linear;

pub use count::Count;
pub use element_2d_var::Element2dVar;
pub use element_var::ElementVar;
pub use if_then_else::IfThenElse;
pub use linear::Linear;

/// The position in an array of `len` elements which `value` selects when the first element has
/// index `offset`. Values outside the array select the nearest element.
pub(crate) fn clamped_index(value: i64, offset: i64, len: usize) -> usize {
    let last = len.saturating_sub(1) as i64;
    value.saturating_sub(offset).clamp(0, last) as usize
}
