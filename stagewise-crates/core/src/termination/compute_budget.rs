use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers once a fixed number of computations took place.
#[derive(Debug, Copy, Clone)]
pub struct ComputeBudget {
    budget: u64,
    num_computes: u64,
}

impl ComputeBudget {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            num_computes: 0,
        }
    }
}

impl TerminationCondition for ComputeBudget {
    fn should_stop(&mut self) -> bool {
        self.num_computes >= self.budget
    }

    fn compute_has_been_performed(&mut self) {
        self.num_computes += 1;
    }
}
