use crate::basic_types::EngineError;
use crate::basic_types::Timestamp;
use crate::propagation::CommittableInt;

/// A stored integer variable: a [`CommittableInt`] together with an inclusive domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct IntVar {
    value: CommittableInt,
    lower_bound: i64,
    upper_bound: i64,
}

impl IntVar {
    pub(crate) fn new(
        timestamp: Timestamp,
        initial_value: i64,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<IntVar, EngineError> {
        if lower_bound > upper_bound {
            return Err(EngineError::EmptyDomain {
                lower_bound,
                upper_bound,
            });
        }
        if initial_value < lower_bound || initial_value > upper_bound {
            return Err(EngineError::ValueOutOfDomain {
                value: initial_value,
                lower_bound,
                upper_bound,
            });
        }

        Ok(IntVar {
            value: CommittableInt::new(timestamp, initial_value),
            lower_bound,
            upper_bound,
        })
    }

    pub(crate) fn value(&self, timestamp: Timestamp) -> i64 {
        self.value.value(timestamp)
    }

    pub(crate) fn committed_value(&self) -> i64 {
        self.value.committed_value()
    }

    pub(crate) fn has_changed(&self, timestamp: Timestamp) -> bool {
        self.value.has_changed(timestamp)
    }

    pub(crate) fn set_value(&mut self, timestamp: Timestamp, value: i64) {
        self.value.set_value(timestamp, value)
    }

    pub(crate) fn inc_value(&mut self, timestamp: Timestamp, delta: i64) -> i64 {
        self.value.inc_value(timestamp, delta)
    }

    pub(crate) fn commit(&mut self) {
        self.value.commit()
    }

    pub(crate) fn commit_if(&mut self, timestamp: Timestamp) {
        self.value.commit_if(timestamp)
    }

    pub(crate) fn lower_bound(&self) -> i64 {
        self.lower_bound
    }

    pub(crate) fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    pub(crate) fn in_domain(&self, value: i64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }

    /// Replaces the domain, or with `widen_only` extends it to include the given bounds.
    ///
    /// The value is not checked against the new domain; the value of a defined variable is brought
    /// in line by the next propagation.
    pub(crate) fn update_bounds(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
        widen_only: bool,
    ) -> Result<(), EngineError> {
        let (lower_bound, upper_bound) = if widen_only {
            (
                lower_bound.min(self.lower_bound),
                upper_bound.max(self.upper_bound),
            )
        } else {
            (lower_bound, upper_bound)
        };

        if lower_bound > upper_bound {
            return Err(EngineError::EmptyDomain {
                lower_bound,
                upper_bound,
            });
        }

        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;

        Ok(())
    }
}
