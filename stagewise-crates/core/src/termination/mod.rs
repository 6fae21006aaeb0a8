//! A [`TerminationCondition`] is polled by [`Pipeline::run`] before every round of computation.
//! It indicates when the driver should stop, even though stages could still perform work. The
//! most common example would be [`TimeBudget`], which gives the pipeline a certain time budget
//! to explore.
#[cfg(doc)]
use crate::pipeline::Pipeline;

mod combinator;
mod compute_budget;
mod indefinite;
mod time_budget;

pub use combinator::Combinator;
pub use compute_budget::ComputeBudget;
pub use indefinite::Indefinite;
pub use time_budget::TimeBudget;

/// The central trait that defines a termination condition. A termination condition determines when
/// the driver should give up exploring.
pub trait TerminationCondition {
    /// Returns `true` when the driver should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;
    /// Called after every successful call to a stage's `compute`.
    fn compute_has_been_performed(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn compute_has_been_performed(&mut self) {
        if let Some(t) = self {
            t.compute_has_been_performed()
        }
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for &mut T {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }

    fn compute_has_been_performed(&mut self) {
        (**self).compute_has_been_performed()
    }
}
