use log::debug;

use crate::interface::InterfaceFlags;
use crate::interface::StateDraft;
use crate::interface::GENERATE;
use crate::solutions::SubTrajectory;
use crate::stage::ComputeContext;
use crate::stage::ReadContext;
use crate::stage::Stage;

/// A newly generated state together with the solution which marks it as a starting point.
#[derive(Clone, Debug)]
pub struct Generated {
    pub state: StateDraft,
    pub solution: SubTrajectory,
}

impl Generated {
    pub fn new(state: StateDraft, solution: SubTrajectory) -> Self {
        Generated { state, solution }
    }
}

/// The domain computation of a [`Generator`].
pub trait Generate {
    /// Whether more candidates remain.
    fn can_compute(&self) -> bool;

    /// Produce the next candidate.
    fn compute(&mut self) -> Generated;
}

/// A stage without pull interfaces which synthesizes states and spawns them in both directions.
#[derive(Debug)]
pub struct Generator<G> {
    name: String,
    hook: G,
}

impl<G: Generate> Generator<G> {
    pub fn new(name: impl Into<String>, hook: G) -> Self {
        Generator {
            name: name.into(),
            hook,
        }
    }

    pub fn hook(&self) -> &G {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut G {
        &mut self.hook
    }
}

impl<G: Generate + 'static> Stage for Generator<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_interface(&self) -> InterfaceFlags {
        GENERATE
    }

    fn can_compute(&self, _context: ReadContext) -> bool {
        self.hook.can_compute()
    }

    fn compute(&mut self, mut context: ComputeContext) {
        let Generated { state, solution } = self.hook.compute();
        debug!(
            "{}: generated a state with priority {} (cost {})",
            self.name,
            state.priority,
            solution.cost()
        );

        let _ = context.spawn(state, solution);
    }
}
