use log::debug;

use super::SolutionBase;

/// An observer attached to a pipeline for inspecting its search.
///
/// While an introspection handle is attached, stages retain their failing solutions instead of
/// only counting them.
#[derive(Clone, Debug)]
pub struct Introspection {
    task_id: String,
}

impl Introspection {
    pub fn new(task_id: impl Into<String>) -> Self {
        Introspection {
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub(crate) fn record_failure(&self, stage: &str, solution: &SolutionBase) {
        debug!(
            "[{}] stage '{}' retained failure {} ({})",
            self.task_id,
            stage,
            solution.id(),
            solution.comment()
        );
    }
}
