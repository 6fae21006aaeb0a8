use std::rc::Rc;

use super::SolutionBase;
use crate::containers::StorageKey;

/// Invoked synchronously for every successful solution stored by the stage it is registered
/// with, in the order of registration.
pub trait SolutionCallback {
    fn on_solution(&mut self, solution: &Rc<SolutionBase>);
}

impl<T> SolutionCallback for T
where
    T: FnMut(&Rc<SolutionBase>),
{
    fn on_solution(&mut self, solution: &Rc<SolutionBase>) {
        (self)(solution)
    }
}

/// Identifies a registered [`SolutionCallback`] so that it can be removed again.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SolutionCallbackId(u32);

impl StorageKey for SolutionCallbackId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        SolutionCallbackId(index as u32)
    }
}
