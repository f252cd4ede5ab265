//! Invariants whose defined variable measures the violation of a constraint; a violation of `0`
//! means the constraint is satisfied.
mod all_different;
mod equal;
mod less_equal;

pub use all_different::AllDifferent;
pub use equal::Equal;
pub use less_equal::LessEqual;
