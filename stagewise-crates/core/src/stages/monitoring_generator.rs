use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::debug;

use super::Generated;
use crate::basic_types::ConfigurationError;
use crate::interface::InterfaceFlags;
use crate::interface::StateStore;
use crate::interface::GENERATE;
use crate::solutions::SolutionBase;
use crate::solutions::SolutionCallbackId;
use crate::stage::ComputeContext;
use crate::stage::InitialisationContext;
use crate::stage::ReadContext;
use crate::stage::Stage;
use crate::stage::StageId;

/// The domain computation of a [`MonitoringGenerator`].
pub trait Monitor {
    /// Derive a candidate from a successful solution of the monitored stage; [`None`] if the
    /// solution does not give rise to a new state.
    fn on_monitored_solution(
        &mut self,
        solution: &SolutionBase,
        states: &StateStore,
    ) -> Option<Generated>;
}

/// A generator which derives its states from the solutions of another stage.
///
/// The solutions are collected by a callback registered on the monitored stage during
/// initialisation, and turned into states one at a time when computing.
#[derive(Debug)]
pub struct MonitoringGenerator<M> {
    name: String,
    monitored: StageId,
    callback: Option<SolutionCallbackId>,
    inbox: Rc<RefCell<VecDeque<Rc<SolutionBase>>>>,
    hook: M,
}

impl<M: Monitor> MonitoringGenerator<M> {
    pub fn new(name: impl Into<String>, monitored: StageId, hook: M) -> Self {
        MonitoringGenerator {
            name: name.into(),
            monitored,
            callback: None,
            inbox: Rc::default(),
            hook,
        }
    }

    pub fn monitored(&self) -> StageId {
        self.monitored
    }

    /// The registration on the monitored stage, once initialised.
    pub fn callback(&self) -> Option<SolutionCallbackId> {
        self.callback
    }

    /// The number of monitored solutions which have not been processed yet.
    pub fn num_pending(&self) -> usize {
        self.inbox.borrow().len()
    }

    pub fn hook(&self) -> &M {
        &self.hook
    }
}

impl<M: Monitor + 'static> Stage for MonitoringGenerator<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_interface(&self) -> InterfaceFlags {
        GENERATE
    }

    fn initialise(&mut self, mut context: InitialisationContext) -> Result<(), ConfigurationError> {
        if !context.contains_stage(self.monitored) {
            self.callback = None;
            return Err(ConfigurationError::MissingMonitoredStage {
                stage: self.name.clone(),
            });
        }
        if self.callback.is_some() {
            return Ok(());
        }

        let inbox = Rc::clone(&self.inbox);
        let callback = context
            .add_solution_callback(
                self.monitored,
                Box::new(move |solution: &Rc<SolutionBase>| {
                    inbox.borrow_mut().push_back(Rc::clone(solution));
                }),
            )
            .ok_or_else(|| ConfigurationError::MissingMonitoredStage {
                stage: self.name.clone(),
            })?;

        debug!("{}: monitoring {}", self.name, self.monitored);
        self.callback = Some(callback);
        Ok(())
    }

    fn can_compute(&self, _context: ReadContext) -> bool {
        !self.inbox.borrow().is_empty()
    }

    fn compute(&mut self, mut context: ComputeContext) {
        let Some(solution) = self.inbox.borrow_mut().pop_front() else {
            return;
        };

        if let Some(Generated { state, solution }) =
            self.hook.on_monitored_solution(&solution, context.states())
        {
            let _ = context.spawn(state, solution);
        }
    }
}
