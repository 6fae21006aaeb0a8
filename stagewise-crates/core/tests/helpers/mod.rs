#![allow(dead_code, reason = "not every test file uses every helper")]

use stagewise_core::interface::Interface;
use stagewise_core::interface::StateStore;
use stagewise_core::stages::Connect;
use stagewise_core::stages::Generate;
use stagewise_core::stages::Generated;
use stagewise_core::stages::Monitor;
use stagewise_core::stages::Propagate;
use stagewise_core::stages::Propagated;
use stagewise_core::InterfaceState;
use stagewise_core::SolutionBase;
use stagewise_core::StateDraft;
use stagewise_core::SubTrajectory;

/// Generates states with the given priorities, in the given order.
#[derive(Debug)]
pub struct Priorities(pub Vec<f64>);

impl Generate for Priorities {
    fn can_compute(&self) -> bool {
        !self.0.is_empty()
    }

    fn compute(&mut self) -> Generated {
        let priority = self.0.remove(0);
        Generated::new(StateDraft::new(priority, priority), SubTrajectory::new(0.0))
    }
}

/// Propagates forward with a cost equal to the priority of the input, failing from `limit` on.
#[derive(Debug)]
pub struct Threshold {
    pub limit: f64,
    pub inputs: Vec<f64>,
}

impl Threshold {
    pub fn new(limit: f64) -> Self {
        Threshold {
            limit,
            inputs: vec![],
        }
    }
}

impl Propagate for Threshold {
    fn compute_forward(&mut self, from: &InterfaceState) -> Propagated {
        let priority = from.priority().value();
        self.inputs.push(priority);

        if priority < self.limit {
            Propagated::success(
                StateDraft::from_shared(from.shared_payload(), priority),
                SubTrajectory::new(priority),
            )
        } else {
            Propagated::failure(SubTrajectory::failure())
        }
    }
}

/// Records every attempted pair by the priorities of its states; links pairs whose summed
/// priority stays below `limit`.
#[derive(Debug, Default)]
pub struct Recorder {
    pub limit: Option<f64>,
    pub attempts: Vec<(f64, f64)>,
}

impl Connect for Recorder {
    fn connect(&mut self, from: &InterfaceState, to: &InterfaceState) -> SubTrajectory {
        let pair = (from.priority().value(), to.priority().value());
        self.attempts.push(pair);

        match self.limit {
            Some(limit) if pair.0 + pair.1 >= limit => SubTrajectory::failure(),
            _ => SubTrajectory::new(pair.0 + pair.1),
        }
    }
}

/// Turns every monitored solution into a state with the cost of the solution as priority.
#[derive(Debug, Default)]
pub struct Echo {
    pub seen: usize,
}

impl Monitor for Echo {
    fn on_monitored_solution(
        &mut self,
        solution: &SolutionBase,
        _states: &StateStore,
    ) -> Option<Generated> {
        self.seen += 1;
        Some(Generated::new(
            StateDraft::new(solution.id(), solution.cost()),
            SubTrajectory::new(1.0),
        ))
    }
}

/// The priorities of the states on `interface`, in the order in which they would be consumed.
pub fn priorities(interface: &Interface, states: &StateStore) -> Vec<f64> {
    interface
        .iter()
        .filter_map(|state| states.get(state))
        .map(|state| state.priority().value())
        .collect()
}
