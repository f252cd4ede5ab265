//! Views: variables which are pure functions of a single parent variable or view.
mod bool2int_view;
mod element_const;
mod equal_const;
mod int_offset_view;
mod scalar_view;

pub use bool2int_view::Bool2IntView;
pub use element_const::ElementConst;
pub use equal_const::EqualConst;
pub use int_offset_view::IntOffsetView;
pub use scalar_view::ScalarView;
