use std::fmt::Debug;
use std::rc::Rc;

use super::Introspection;
use super::SolutionBase;
use super::SolutionCallback;
use super::SolutionCallbackId;
use crate::basic_types::DebugDyn;
use crate::containers::CostQueue;
use crate::containers::KeyGenerator;

/// The solutions computed by a single stage.
///
/// Successful solutions are kept ordered by cost, cheapest first. Failures are retained only
/// while an [`Introspection`] is attached; otherwise they are counted.
#[derive(Default)]
pub struct SolutionStore {
    solutions: CostQueue<Rc<SolutionBase>>,
    failures: Vec<Rc<SolutionBase>>,
    num_failures: usize,
    callbacks: Vec<(SolutionCallbackId, Box<dyn SolutionCallback>)>,
    callback_ids: KeyGenerator<SolutionCallbackId>,
}

impl SolutionStore {
    /// Record `solution`; returns whether it was a success and its listeners should be informed
    /// through [`SolutionStore::new_solution`].
    pub(crate) fn store_solution(
        &mut self,
        solution: &Rc<SolutionBase>,
        stage: &str,
        introspection: Option<&Introspection>,
    ) -> bool {
        if !solution.is_failure() {
            let _ = self.solutions.push(solution.cost(), Rc::clone(solution));
            return true;
        }

        match introspection {
            Some(introspection) => {
                introspection.record_failure(stage, solution);
                self.failures.push(Rc::clone(solution));
            }
            None => self.num_failures += 1,
        }
        false
    }

    /// Inform every registered callback about the successful `solution`.
    pub(crate) fn new_solution(&mut self, solution: &Rc<SolutionBase>) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback.on_solution(solution);
        }
    }

    pub(crate) fn add_callback(
        &mut self,
        callback: Box<dyn SolutionCallback>,
    ) -> SolutionCallbackId {
        let id = self.callback_ids.next_key();
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove_callback(&mut self, id: SolutionCallbackId) -> bool {
        let num_callbacks = self.callbacks.len();
        self.callbacks.retain(|(registered, _)| *registered != id);
        num_callbacks != self.callbacks.len()
    }

    pub fn num_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    /// Iterate over the successful solutions, cheapest first.
    pub fn solutions(&self) -> impl Iterator<Item = &Rc<SolutionBase>> + '_ {
        self.solutions.iter().map(|(_, solution)| solution)
    }

    pub fn cheapest(&self) -> Option<&Rc<SolutionBase>> {
        self.solutions.peek().map(|(_, solution)| solution)
    }

    pub fn num_solutions(&self) -> usize {
        self.solutions.len()
    }

    /// The failures which were retained while an introspection was attached.
    pub fn failures(&self) -> &[Rc<SolutionBase>] {
        &self.failures
    }

    /// The number of failures, retained or not.
    pub fn num_failures(&self) -> usize {
        self.num_failures + self.failures.len()
    }
}

impl Debug for SolutionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let callbacks: Vec<_> = self
            .callbacks
            .iter()
            .map(|_| DebugDyn::from("SolutionCallback"))
            .collect();

        f.debug_struct("SolutionStore")
            .field("solutions", &self.solutions)
            .field("failures", &self.failures)
            .field("num_failures", &self.num_failures)
            .field("callbacks", &callbacks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::solutions::SolutionId;
    use crate::solutions::SubTrajectory;
    use crate::stage::StageId;

    fn solution(id: u32, cost: f64) -> Rc<SolutionBase> {
        Rc::new(SolutionBase::new(
            SolutionId(id),
            StageId(0),
            None,
            None,
            SubTrajectory::new(cost),
        ))
    }

    #[test]
    fn solutions_are_ordered_by_cost() {
        let mut store = SolutionStore::default();
        for (id, cost) in [(0, 3.0), (1, 1.0), (2, 2.0)] {
            assert!(store.store_solution(&solution(id, cost), "stage", None));
        }

        let order = store
            .solutions()
            .map(|solution| solution.id())
            .collect::<Vec<_>>();
        assert_eq!(vec![SolutionId(1), SolutionId(2), SolutionId(0)], order);
        assert_eq!(Some(SolutionId(1)), store.cheapest().map(|s| s.id()));
    }

    #[test]
    fn failures_are_counted_or_retained() {
        let mut store = SolutionStore::default();
        let introspection = Introspection::new("task");

        assert!(!store.store_solution(&solution(0, f64::INFINITY), "stage", None));
        assert!(store.failures().is_empty());
        assert!(!store.store_solution(
            &solution(1, f64::INFINITY),
            "stage",
            Some(&introspection)
        ));

        assert_eq!(2, store.num_failures());
        assert_eq!(1, store.failures().len());
        assert_eq!(0, store.num_solutions());
    }

    #[test]
    fn callbacks_run_in_registration_order_until_removed() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut store = SolutionStore::default();

        let first_calls = Rc::clone(&calls);
        let first = store.add_callback(Box::new(move |solution: &Rc<SolutionBase>| {
            first_calls.borrow_mut().push(("first", solution.id()))
        }));
        let second_calls = Rc::clone(&calls);
        let _ = store.add_callback(Box::new(move |solution: &Rc<SolutionBase>| {
            second_calls.borrow_mut().push(("second", solution.id()))
        }));

        store.new_solution(&solution(0, 1.0));
        assert!(store.remove_callback(first));
        assert!(!store.remove_callback(first));
        store.new_solution(&solution(1, 1.0));

        assert_eq!(
            vec![
                ("first", SolutionId(0)),
                ("second", SolutionId(0)),
                ("second", SolutionId(1))
            ],
            *calls.borrow()
        );
    }
}
